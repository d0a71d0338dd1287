//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::SkillKey;

/// Domain errors represent tree invariant violations.
/// These are independent of storage and presentation concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("skill not found: {0}")]
    NotFound(SkillKey),

    #[error("skill already exists: {0}")]
    DuplicateId(SkillKey),

    #[error("root skill cannot be deleted: {0}")]
    ProtectedRoot(SkillKey),

    #[error("parent {parent} belongs to another owner than {child}")]
    InvalidParent { child: SkillKey, parent: String },

    #[error("invalid skill id: {0:?}")]
    InvalidId(String),

    #[error("cycle detected in hierarchy: {0}")]
    CycleDetected(SkillKey),

    #[error("parent {parent} of {child} does not exist")]
    DanglingParent { child: SkillKey, parent: String },
}

impl DomainError {
    /// Stable status signal for request/response boundaries.
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::NotFound(_) => 404,
            DomainError::DuplicateId(_) | DomainError::InvalidId(_) => 400,
            DomainError::ProtectedRoot(_) => 403,
            DomainError::InvalidParent { .. } => 422,
            DomainError::CycleDetected(_) | DomainError::DanglingParent { .. } => 500,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
