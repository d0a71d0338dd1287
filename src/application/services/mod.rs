//! Application services

pub mod identity;
pub mod skill_tree;

pub use identity::{IdentityService, UserInit};
pub use skill_tree::{SkillTreeService, TreeStats};
