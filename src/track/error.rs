//! Generator errors and candidate rejections

use thiserror::Error;

/// Errors surfaced to callers of the generator
#[derive(Error, Debug)]
pub enum TrackError {
    /// A segment template has no exit anchor and can never be chained
    #[error("segment template {name:?} has no ExitPoint anchor")]
    InvalidTemplate { name: String },

    /// No usable segment templates were supplied
    #[error("segment catalog is empty")]
    EmptyCatalog,

    /// Every candidate was rejected on every attempt; the path is blocked
    #[error("generation stalled: path blocked after {attempts} attempts")]
    GenerationStalled { attempts: u32 },

    /// Settings JSON could not be parsed
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// Settings file could not be read
    #[error("settings file: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single candidate segment was not committed
///
/// Rejections are routine and never abort an extension call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Turn kind while the window's turn budget is spent
    TurnLimit,
    /// Catalog has no template of this kind
    NoTemplates,
    /// Materialized instance had no exit anchor
    MissingExit,
    /// Predicted exit or lookahead position already occupied
    Occupied,
    /// Collider intersects already placed bridge geometry
    Overlap,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::TurnLimit => "turn limit",
            Rejection::NoTemplates => "no templates",
            Rejection::MissingExit => "missing exit",
            Rejection::Occupied => "occupied",
            Rejection::Overlap => "overlap",
        }
    }
}
