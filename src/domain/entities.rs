//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest reachable proficiency level.
pub const MAX_LEVEL: u8 = 100;

/// Amount a single training session adds to a skill.
pub const TRAIN_INCREMENT: u8 = 10;

/// Identifier of the user a skill tree belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Skill identifiers are unique per owner, so a skill is addressed by both.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SkillKey {
    pub owner: OwnerId,
    pub id: String,
}

impl SkillKey {
    pub fn new(owner: &OwnerId, id: impl Into<String>) -> Self {
        Self {
            owner: owner.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for SkillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.id)
    }
}

/// Display position of a node on the tree canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Proficiency level, always within `0..=MAX_LEVEL`.
///
/// Values coming from storage are clamped on the way in, so a hand-edited
/// snapshot can never push a skill out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Level(u8);

impl Level {
    pub const ZERO: Level = Level(0);
    pub const MAX: Level = Level(MAX_LEVEL);

    /// Clamp an arbitrary value into the valid range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, MAX_LEVEL as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Level after one training session, saturating at `MAX_LEVEL`.
    pub fn trained(self) -> Self {
        Self::clamped(self.0 as i64 + TRAIN_INCREMENT as i64)
    }
}

impl From<i64> for Level {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Level> for i64 {
    fn from(level: Level) -> Self {
        level.0 as i64
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single node of a skill tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: Level,
    pub pos: Position,
    /// Parent skill id within the same owner, None for roots
    pub parent: Option<String>,
    pub owner: OwnerId,
}

impl Skill {
    pub fn key(&self) -> SkillKey {
        SkillKey::new(&self.owner, self.id.clone())
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Listing shape of a skill: `{name, level, parent, pos: {x, y}}`, keyed by id
/// in the surrounding map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillView {
    pub name: String,
    pub level: Level,
    pub parent: Option<String>,
    pub pos: Position,
}

impl From<&Skill> for SkillView {
    fn from(skill: &Skill) -> Self {
        Self {
            name: skill.name.clone(),
            level: skill.level,
            parent: skill.parent.clone(),
            pos: skill.pos,
        }
    }
}

/// User known to the system, mapped from an external identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    /// Identity assigned by the external provider (e.g. a messenger user id)
    pub external_id: i64,
    pub username: Option<String>,
}

/// Result of a cascade delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedSummary {
    pub owner: OwnerId,
    /// Removed skill ids, descendants before their ancestors
    pub removed: Vec<String>,
}

impl DeletedSummary {
    pub fn count(&self) -> usize {
        self.removed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_out_of_range_value_when_clamped_then_stays_in_bounds() {
        assert_eq!(Level::clamped(-5), Level::ZERO);
        assert_eq!(Level::clamped(250), Level::MAX);
        assert_eq!(Level::clamped(42).value(), 42);
    }

    #[test]
    fn given_level_95_when_trained_then_saturates_at_100() {
        assert_eq!(Level::clamped(95).trained(), Level::MAX);
        assert_eq!(Level::MAX.trained(), Level::MAX);
        assert_eq!(Level::ZERO.trained().value(), 10);
    }

    #[test]
    fn given_stored_level_above_max_when_deserialized_then_clamped() {
        let level: Level = serde_json::from_str("140").unwrap();
        assert_eq!(level, Level::MAX);
    }

    #[test]
    fn given_skill_when_viewed_then_listing_shape_matches() {
        let skill = Skill {
            id: "python".into(),
            name: "Python".into(),
            level: Level::clamped(80),
            pos: Position::new(200, 200),
            parent: Some("root".into()),
            owner: OwnerId::from("local"),
        };

        let json = serde_json::to_value(SkillView::from(&skill)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Python",
                "level": 80,
                "parent": "root",
                "pos": {"x": 200, "y": 200}
            })
        );
    }
}
