//! Domain layer: entities and tree logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod layout;
pub mod registry;

pub use arena::{NewSkill, SkillForest, SkillNode, ROOT_ID};
pub use builder::ForestBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use layout::compute_position;
pub use registry::OwnerRegistry;
