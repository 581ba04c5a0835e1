//! Error and warning types for alias generation.
//!
//! [`AliasError`] covers every fatal condition: configuration mistakes found
//! before resolution, resolution exhaustion, and the I/O and parse failures
//! of config and tree files. Recoverable conditions are reported as
//! [`Warning`] values next to a successful result.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::validate::ValidationError;

/// Errors that abort alias generation.
#[derive(Debug, Error)]
pub enum AliasError {
    /// A command cannot get a unique abbreviation, even spelled out in full.
    #[error("no abbreviation found for command {command}")]
    NoAbbreviation { command: String },

    /// Two predefined entries ask for the same abbreviation.
    #[error("duplicate predefined abbreviation '{abbrev}' for '{first}' and '{second}'")]
    DuplicatePredefined {
        abbrev: String,
        first: String,
        second: String,
    },

    /// A predefined abbreviation is empty or contains whitespace.
    #[error("invalid predefined abbreviation '{abbrev}' for '{command}'")]
    InvalidPredefined { command: String, abbrev: String },

    /// A nested predefined command whose parent is not predefined.
    #[error("predefined command '{command}' requires its parent '{parent}' to be predefined")]
    PredefinedParentMissing { command: String, parent: String },

    /// A nested predefined abbreviation that does not start with the
    /// parent's abbreviation.
    #[error("predefined abbreviation '{abbrev}' for '{command}' must extend '{parent}'")]
    PredefinedBreaksPrefix {
        command: String,
        abbrev: String,
        parent: String,
    },

    /// The standalone root alias is already taken.
    #[error("root alias '{alias}' collides with the alias for '{existing}'")]
    RootAliasCollision { alias: String, existing: String },

    /// Two commands kept evicting each other.
    #[error("no abbreviation found for command {evicted}: repeatedly evicted by {evictor}")]
    EvictionCycle { evictor: String, evicted: String },

    /// The work queue did not drain within its pass budget.
    #[error("abbreviation resolution did not converge within {passes} passes")]
    PassBudgetExceeded { passes: usize },

    /// A command was resolved before its parent had an abbreviation.
    #[error("parent of '{0}' has no abbreviation")]
    UnresolvedParent(String),

    /// Structural problem with the command tree.
    #[error("invalid command tree: {0}")]
    InvalidTree(#[from] ValidationError),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results with [`AliasError`].
pub type Result<T> = std::result::Result<T, AliasError>;

/// Non-fatal condition recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A predefined command is not part of the discovered tree.
    MissingPredefined { command: String },
    /// A legacy filter entry is not part of the discovered tree.
    MissingLegacy { command: String },
    /// A flag preset names a missing command or is malformed.
    SkippedFlagPreset { command: String, reason: String },
    /// A flag-combination alias lost against an existing entry.
    FlagAliasCollision {
        abbrev: String,
        dropped: String,
        existing: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPredefined { command } => {
                write!(f, "skipped predefined command not found in tree: {command}")
            }
            Self::MissingLegacy { command } => {
                write!(f, "legacy command not found in tree: {command}")
            }
            Self::SkippedFlagPreset { command, reason } => {
                write!(f, "skipped flag preset for '{command}': {reason}")
            }
            Self::FlagAliasCollision {
                abbrev,
                dropped,
                existing,
            } => write!(
                f,
                "dropped flag alias '{abbrev}' for '{dropped}': already used by '{existing}'"
            ),
        }
    }
}

impl Warning {
    /// Returns `true` for flag-combination collisions, which are expected in
    /// bulk and usually only summarized.
    pub fn is_flag_collision(&self) -> bool {
        matches!(self, Self::FlagAliasCollision { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_abbreviation_message() {
        let err = AliasError::NoAbbreviation {
            command: "docker build".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no abbreviation found for command docker build"
        );
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = Warning::MissingPredefined {
            command: "docker app".to_string(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "missing_predefined");
        assert_eq!(json["command"], "docker app");
    }
}
