//! Common error infrastructure for progression-core.
//!
//! Every rejected operation leaves the actor's ledger exactly as it was before
//! the call. Failures carry a [`ErrorKind`] so callers can branch on the
//! category without matching every variant, and an [`ErrorSeverity`] used by
//! the runtime for logging priority.
//!
//! Cast and timed-effect failures have their own enums
//! ([`crate::cast::CastFailure`], [`crate::effects::EffectError`]) defined next
//! to the code that produces them.

use crate::state::{AttributeKey, ClassGroup, ClassId, SkillKey};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: may succeed later without changing the request (budget, cooldown)
/// - **Validation**: the request itself is wrong (unknown key, requirement unmet)
/// - **Internal**: unexpected state inconsistency, indicates a bug
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all progression-core errors.
pub trait ProgressionFault: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier of the variant, for metrics and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Failure taxonomy shared by the ledger, skill and class operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown attribute, skill or class identifier.
    InvalidKey,
    /// Not enough points in the funding budget.
    BudgetExceeded,
    /// A requirement or structural rule is not satisfied.
    IneligibleState,
    /// The commit hook denied the tentative mutation; it was rolled back.
    VetoedByHook,
    /// Maximum or minimum stage/level already reached.
    AlreadyAtBound,
}

/// Error returned by ledger, skill and class operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProgressionError {
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(AttributeKey),

    #[error("unknown skill '{0}'")]
    UnknownSkill(SkillKey),

    #[error("unknown class '{0}'")]
    UnknownClass(ClassId),

    #[error("no class professed in group '{0}'")]
    GroupNotProfessed(ClassGroup),

    #[error("insufficient points: required {required}, available {available}")]
    InsufficientPoints { required: i64, available: i64 },

    #[error("requirements for skill '{0}' are not met")]
    RequirementsNotMet(SkillKey),

    #[error("skill '{0}' cannot be downgraded because it is free")]
    FreeSkill(SkillKey),

    #[error("skill '{skill}' is required by '{dependent}'")]
    RequiredBy { skill: SkillKey, dependent: SkillKey },

    #[error("class '{0}' cannot be professed now")]
    CannotProfess(ClassId),

    #[error("transaction denied by commit hook")]
    Vetoed,

    #[error("already at maximum ({max})")]
    AtMaximum { max: i32 },

    #[error("already at minimum")]
    AtMinimum,
}

impl ProgressionError {
    /// Maps the variant onto the shared failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAttribute(_) | Self::UnknownSkill(_) | Self::UnknownClass(_) => {
                ErrorKind::InvalidKey
            }
            Self::InsufficientPoints { .. } => ErrorKind::BudgetExceeded,
            Self::GroupNotProfessed(_)
            | Self::RequirementsNotMet(_)
            | Self::FreeSkill(_)
            | Self::RequiredBy { .. }
            | Self::CannotProfess(_) => ErrorKind::IneligibleState,
            Self::Vetoed => ErrorKind::VetoedByHook,
            Self::AtMaximum { .. } | Self::AtMinimum => ErrorKind::AlreadyAtBound,
        }
    }
}

impl ProgressionFault for ProgressionError {
    fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::BudgetExceeded | ErrorKind::VetoedByHook => ErrorSeverity::Recoverable,
            ErrorKind::InvalidKey | ErrorKind::IneligibleState | ErrorKind::AlreadyAtBound => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAttribute(_) => "UNKNOWN_ATTRIBUTE",
            Self::UnknownSkill(_) => "UNKNOWN_SKILL",
            Self::UnknownClass(_) => "UNKNOWN_CLASS",
            Self::GroupNotProfessed(_) => "GROUP_NOT_PROFESSED",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::RequirementsNotMet(_) => "REQUIREMENTS_NOT_MET",
            Self::FreeSkill(_) => "FREE_SKILL",
            Self::RequiredBy { .. } => "REQUIRED_BY",
            Self::CannotProfess(_) => "CANNOT_PROFESS",
            Self::Vetoed => "VETOED",
            Self::AtMaximum { .. } => "AT_MAXIMUM",
            Self::AtMinimum => "AT_MINIMUM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_maps_to_one_kind() {
        assert_eq!(
            ProgressionError::UnknownAttribute("str".into()).kind(),
            ErrorKind::InvalidKey
        );
        assert_eq!(
            ProgressionError::InsufficientPoints {
                required: 5,
                available: 3
            }
            .kind(),
            ErrorKind::BudgetExceeded
        );
        assert_eq!(ProgressionError::Vetoed.kind(), ErrorKind::VetoedByHook);
        assert_eq!(
            ProgressionError::AtMaximum { max: 5 }.kind(),
            ErrorKind::AlreadyAtBound
        );
        assert_eq!(ErrorKind::VetoedByHook.to_string(), "vetoed_by_hook");
    }

    #[test]
    fn vetoes_are_recoverable() {
        assert!(ProgressionError::Vetoed.severity().is_recoverable());
        assert_eq!(
            ProgressionError::FreeSkill("heal".into()).severity(),
            ErrorSeverity::Validation
        );
    }
}
