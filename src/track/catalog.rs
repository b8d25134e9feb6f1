//! Segment and obstacle catalogs
//!
//! Templates are classified once at load time. Kinds come from explicit
//! metadata when present and otherwise from the template's naming
//! convention; nothing is re-derived from names while generating.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::cooldown::CooldownMap;
use super::error::TrackError;
use super::world::PrefabId;
use crate::consts::{EXIT_ANCHOR, SPAWN_ANCHOR_PREFIX};
use crate::yaw_by_degrees;

/// Segment shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    Straight,
    LeftTurn,
    RightTurn,
}

impl SegmentKind {
    /// Candidate order when straight is preferred
    pub const STRAIGHT_FIRST: [SegmentKind; 3] =
        [SegmentKind::Straight, SegmentKind::LeftTurn, SegmentKind::RightTurn];
    /// Candidate order when turns are preferred
    pub const TURN_FIRST: [SegmentKind; 3] =
        [SegmentKind::LeftTurn, SegmentKind::RightTurn, SegmentKind::Straight];

    /// Classify a template name (case-insensitive)
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("l_turn") {
            SegmentKind::LeftTurn
        } else if lower.contains("r_turn") {
            SegmentKind::RightTurn
        } else {
            SegmentKind::Straight
        }
    }

    #[inline]
    pub fn is_turn(&self) -> bool {
        !matches!(self, SegmentKind::Straight)
    }

    /// Heading change across the segment, about the vertical axis
    pub fn yaw_degrees(&self) -> f32 {
        match self {
            SegmentKind::Straight => 0.0,
            SegmentKind::LeftTurn => -90.0,
            SegmentKind::RightTurn => 90.0,
        }
    }

    /// Direction leaving a segment of this kind entered along `direction`
    pub fn exit_direction(&self, direction: Vec3) -> Vec3 {
        match self {
            SegmentKind::Straight => direction,
            _ => yaw_by_degrees(direction, self.yaw_degrees()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Straight => "straight",
            SegmentKind::LeftTurn => "left",
            SegmentKind::RightTurn => "right",
        }
    }
}

/// Lane an anchor sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnchorKind {
    Center,
    Left,
    Right,
    #[default]
    Any,
}

impl AnchorKind {
    /// Classify an anchor name by its lane suffix (case-sensitive)
    pub fn classify(name: &str) -> Self {
        if name.contains("_Center") {
            AnchorKind::Center
        } else if name.contains("_Left") {
            AnchorKind::Left
        } else if name.contains("_Right") {
            AnchorKind::Right
        } else {
            AnchorKind::Any
        }
    }

    /// Whether an obstacle allowed on `self` may sit on an anchor of `anchor` kind
    #[inline]
    pub fn accepts(self, anchor: AnchorKind) -> bool {
        self == AnchorKind::Any || anchor == AnchorKind::Any || self == anchor
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "center" => Some(AnchorKind::Center),
            "left" => Some(AnchorKind::Left),
            "right" => Some(AnchorKind::Right),
            "any" => Some(AnchorKind::Any),
            _ => None,
        }
    }
}

/// Structured metadata describing one template, as handed over by the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefabInfo {
    pub id: PrefabId,
    pub name: String,
    /// Explicit segment kind; classified from the name when absent
    #[serde(default)]
    pub kind: Option<SegmentKind>,
    /// Names of child anchors
    #[serde(default)]
    pub children: Vec<String>,
    /// Obstacle placement rules, if the template carries any
    #[serde(default)]
    pub obstacle_rules: Option<ObstacleRules>,
}

/// A named point on a segment where an obstacle may go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnAnchor {
    pub name: String,
    pub kind: AnchorKind,
    /// Children with the same name that come before this one
    pub ordinal: usize,
}

/// A validated segment template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentTemplate {
    pub prefab: PrefabId,
    pub name: String,
    pub kind: SegmentKind,
    /// Spawn anchors in declaration order
    pub spawn_anchors: Vec<SpawnAnchor>,
}

impl SegmentTemplate {
    /// Validate and classify a template
    ///
    /// Templates without an exit anchor are rejected.
    pub fn load(info: &PrefabInfo) -> Result<Self, TrackError> {
        if !info.children.iter().any(|c| c == EXIT_ANCHOR) {
            log::warn!("Missing {} on: {}", EXIT_ANCHOR, info.name);
            return Err(TrackError::InvalidTemplate {
                name: info.name.clone(),
            });
        }

        let kind = info.kind.unwrap_or_else(|| SegmentKind::classify(&info.name));
        let spawn_anchors = info
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.starts_with(SPAWN_ANCHOR_PREFIX))
            .map(|(i, c)| SpawnAnchor {
                name: c.clone(),
                kind: AnchorKind::classify(c),
                ordinal: info.children[..i].iter().filter(|prev| *prev == c).count(),
            })
            .collect();

        Ok(Self {
            prefab: info.id,
            name: info.name.clone(),
            kind,
            spawn_anchors,
        })
    }
}

/// All usable segment templates, in the order they were supplied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentCatalog {
    templates: Vec<SegmentTemplate>,
}

impl SegmentCatalog {
    /// Load every valid template; invalid ones are logged and skipped
    pub fn from_prefabs(prefabs: &[PrefabInfo]) -> Result<Self, TrackError> {
        let templates: Vec<_> = prefabs
            .iter()
            .filter_map(|info| SegmentTemplate::load(info).ok())
            .collect();

        if templates.is_empty() {
            return Err(TrackError::EmptyCatalog);
        }

        log::info!(
            "Segment catalog: {} templates ({} straight, {} left, {} right)",
            templates.len(),
            templates.iter().filter(|t| t.kind == SegmentKind::Straight).count(),
            templates.iter().filter(|t| t.kind == SegmentKind::LeftTurn).count(),
            templates.iter().filter(|t| t.kind == SegmentKind::RightTurn).count(),
        );

        Ok(Self { templates })
    }

    /// Build directly from already validated templates
    pub fn from_templates(templates: Vec<SegmentTemplate>) -> Result<Self, TrackError> {
        if templates.is_empty() {
            return Err(TrackError::EmptyCatalog);
        }
        Ok(Self { templates })
    }

    /// Templates of one kind, in catalog order
    pub fn of_kind(&self, kind: SegmentKind) -> Vec<&SegmentTemplate> {
        self.templates.iter().filter(|t| t.kind == kind).collect()
    }

    /// First template; used for the warmup run
    pub fn first(&self) -> Option<&SegmentTemplate> {
        self.templates.first()
    }

    pub fn get(&self, prefab: PrefabId) -> Option<&SegmentTemplate> {
        self.templates.iter().find(|t| t.prefab == prefab)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentTemplate> {
        self.templates.iter()
    }
}

/// Placement rules carried by an obstacle template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleRules {
    /// Anchor lane this obstacle may occupy
    pub allowed: AnchorKind,
    /// Lift above the anchor
    pub height_offset: f32,
    /// Extra rotation in euler degrees, applied after the anchor's rotation
    pub rotation_offset: Vec3,
    /// Segments that must pass before this obstacle may appear again
    pub min_segments_between_spawns: u32,
}

impl Default for ObstacleRules {
    /// No constraints: any lane, no offset, no cooldown
    fn default() -> Self {
        Self {
            allowed: AnchorKind::Any,
            height_offset: 0.0,
            rotation_offset: Vec3::ZERO,
            min_segments_between_spawns: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleTemplate {
    pub prefab: PrefabId,
    pub name: String,
    pub rules: ObstacleRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleCatalog {
    templates: Vec<ObstacleTemplate>,
}

impl ObstacleCatalog {
    /// Load obstacle templates; entries without rules get unconstrained defaults
    pub fn from_prefabs(prefabs: &[PrefabInfo]) -> Self {
        let templates = prefabs
            .iter()
            .map(|info| {
                let rules = info.obstacle_rules.clone().unwrap_or_else(|| {
                    log::warn!("Obstacle {} has no rules, placing unconstrained", info.name);
                    ObstacleRules::default()
                });
                ObstacleTemplate {
                    prefab: info.id,
                    name: info.name.clone(),
                    rules,
                }
            })
            .collect();
        Self { templates }
    }

    pub fn from_templates(templates: Vec<ObstacleTemplate>) -> Self {
        Self { templates }
    }

    /// Templates allowed on `anchor` whose cooldown has expired, in catalog order
    pub fn eligible(&self, anchor: AnchorKind, cooldowns: &CooldownMap) -> Vec<&ObstacleTemplate> {
        self.templates
            .iter()
            .filter(|t| t.rules.allowed.accepts(anchor) && cooldowns.is_ready(t.prefab))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObstacleTemplate> {
        self.templates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: u32, name: &str, children: &[&str]) -> PrefabInfo {
        PrefabInfo {
            id: PrefabId(id),
            name: name.to_string(),
            kind: None,
            children: children.iter().map(|c| c.to_string()).collect(),
            obstacle_rules: None,
        }
    }

    #[test]
    fn test_classify_segment_names() {
        assert_eq!(SegmentKind::classify("Bridge_L_Turn_01"), SegmentKind::LeftTurn);
        assert_eq!(SegmentKind::classify("bridge_r_turn"), SegmentKind::RightTurn);
        assert_eq!(SegmentKind::classify("Bridge_Straight"), SegmentKind::Straight);
        assert_eq!(SegmentKind::classify("Bridge_U_Turn"), SegmentKind::Straight);
    }

    #[test]
    fn test_classify_anchor_names() {
        assert_eq!(AnchorKind::classify("SpawnPoint_Center"), AnchorKind::Center);
        assert_eq!(AnchorKind::classify("SpawnPoint_Left_2"), AnchorKind::Left);
        assert_eq!(AnchorKind::classify("SpawnPoint_Right"), AnchorKind::Right);
        assert_eq!(AnchorKind::classify("SpawnPoint"), AnchorKind::Any);
        // Lane suffixes are case-sensitive
        assert_eq!(AnchorKind::classify("SpawnPoint_center"), AnchorKind::Any);
    }

    #[test]
    fn test_anchor_accepts() {
        assert!(AnchorKind::Any.accepts(AnchorKind::Left));
        assert!(AnchorKind::Left.accepts(AnchorKind::Any));
        assert!(AnchorKind::Left.accepts(AnchorKind::Left));
        assert!(!AnchorKind::Left.accepts(AnchorKind::Right));
        assert!(!AnchorKind::Center.accepts(AnchorKind::Left));
    }

    #[test]
    fn test_anchor_from_str() {
        assert_eq!(AnchorKind::from_str("Center"), Some(AnchorKind::Center));
        assert_eq!(AnchorKind::from_str("LEFT"), Some(AnchorKind::Left));
        assert_eq!(AnchorKind::from_str("any"), Some(AnchorKind::Any));
        assert_eq!(AnchorKind::from_str("middle"), None);
    }

    #[test]
    fn test_exit_direction() {
        let d = SegmentKind::RightTurn.exit_direction(Vec3::Z);
        assert!((d - Vec3::X).length() < 1e-5);
        let d = SegmentKind::LeftTurn.exit_direction(Vec3::Z);
        assert!((d + Vec3::X).length() < 1e-5);
        assert_eq!(SegmentKind::Straight.exit_direction(Vec3::Z), Vec3::Z);
    }

    #[test]
    fn test_load_rejects_missing_exit() {
        let bad = info(1, "Bridge_Straight", &["SpawnPoint_Center"]);
        assert!(matches!(
            SegmentTemplate::load(&bad),
            Err(TrackError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_load_collects_spawn_anchors() {
        let good = info(
            2,
            "Bridge_L_Turn",
            &["ExitPoint", "SpawnPoint_Left", "Rail", "SpawnPoint_Center"],
        );
        let t = SegmentTemplate::load(&good).unwrap();
        assert_eq!(t.kind, SegmentKind::LeftTurn);
        assert_eq!(t.spawn_anchors.len(), 2);
        assert_eq!(t.spawn_anchors[0].kind, AnchorKind::Left);
        assert_eq!(t.spawn_anchors[1].kind, AnchorKind::Center);
        assert!(t.spawn_anchors.iter().all(|a| a.ordinal == 0));
    }

    #[test]
    fn test_repeated_anchor_names_get_ordinals() {
        let t = SegmentTemplate::load(&info(
            4,
            "Bridge_Straight",
            &["SpawnPoint", "ExitPoint", "SpawnPoint_Left", "SpawnPoint", "SpawnPoint"],
        ))
        .unwrap();
        let ordinals: Vec<(&str, usize)> = t
            .spawn_anchors
            .iter()
            .map(|a| (a.name.as_str(), a.ordinal))
            .collect();
        assert_eq!(
            ordinals,
            vec![("SpawnPoint", 0), ("SpawnPoint_Left", 0), ("SpawnPoint", 1), ("SpawnPoint", 2)]
        );
    }

    #[test]
    fn test_explicit_kind_wins() {
        let mut i = info(3, "Bridge_L_Turn", &["ExitPoint"]);
        i.kind = Some(SegmentKind::Straight);
        assert_eq!(SegmentTemplate::load(&i).unwrap().kind, SegmentKind::Straight);
    }

    #[test]
    fn test_catalog_skips_invalid_and_rejects_empty() {
        let cat = SegmentCatalog::from_prefabs(&[
            info(1, "Broken", &[]),
            info(2, "Straight", &["ExitPoint"]),
            info(3, "R_Turn", &["ExitPoint"]),
        ])
        .unwrap();
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.first().unwrap().prefab, PrefabId(2));
        assert_eq!(cat.of_kind(SegmentKind::RightTurn).len(), 1);
        assert!(cat.of_kind(SegmentKind::LeftTurn).is_empty());

        assert!(matches!(
            SegmentCatalog::from_prefabs(&[info(1, "Broken", &[])]),
            Err(TrackError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_obstacle_without_rules_is_unconstrained() {
        let cat = ObstacleCatalog::from_prefabs(&[info(9, "Barrel", &[])]);
        let t = cat.iter().next().unwrap();
        assert_eq!(t.rules, ObstacleRules::default());
        assert_eq!(cat.eligible(AnchorKind::Right, &CooldownMap::default()).len(), 1);
    }

    #[test]
    fn test_obstacle_rules_from_json() {
        let rules: ObstacleRules =
            serde_json::from_str(r#"{ "allowed": "Center", "min_segments_between_spawns": 3 }"#)
                .unwrap();
        assert_eq!(rules.allowed, AnchorKind::Center);
        assert_eq!(rules.min_segments_between_spawns, 3);
        assert_eq!(rules.height_offset, 0.0);
    }
}
