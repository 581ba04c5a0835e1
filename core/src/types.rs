//! Type definitions for command trees and alias entries.
//!
//! This module defines the node and flag records that discovery produces and
//! the resolver annotates, plus the [`AliasEntry`] rows of the final alias
//! table. Flags round-trip through [`serde`] as part of the tree interchange
//! format (see [`CommandSpec`](crate::CommandSpec)).

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// A flag accepted by one command.
///
/// Every flag has a long form. The short form and the value-taking attribute
/// are independent, optional properties. Construct flags through
/// [`boolean`](FlagDescriptor::boolean) or
/// [`with_value`](FlagDescriptor::with_value) so the combination of fields
/// is checked.
///
/// # Examples
///
/// ```
/// use command_alias_core::FlagDescriptor;
///
/// let detach = FlagDescriptor::boolean(Some('d'), "detach").unwrap();
/// assert_eq!(detach.short_flag().as_deref(), Some("-d"));
/// assert_eq!(detach.long_flag(), "--detach");
/// assert!(!detach.takes_argument);
///
/// let name = FlagDescriptor::with_value(None, "name").unwrap();
/// assert!(name.takes_argument);
///
/// assert!(FlagDescriptor::boolean(None, "").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDescriptor {
    /// Single-character form without the dash (`d` for `-d`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    /// Long form without the dashes (`detach` for `--detach`).
    pub long: String,
    /// Explicit short alias for a long-only flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_abbrev: Option<String>,
    /// Whether the flag consumes a value.
    #[serde(default)]
    pub takes_argument: bool,
}

impl FlagDescriptor {
    /// Creates a boolean flag.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the long form is empty or the short
    /// form is not an ASCII alphanumeric character.
    pub fn boolean(short: Option<char>, long: &str) -> Result<Self, ValidationError> {
        Self::new(short, long, false)
    }

    /// Creates a flag that consumes a value.
    ///
    /// # Errors
    ///
    /// Same rules as [`boolean`](FlagDescriptor::boolean).
    pub fn with_value(short: Option<char>, long: &str) -> Result<Self, ValidationError> {
        Self::new(short, long, true)
    }

    fn new(short: Option<char>, long: &str, takes_argument: bool) -> Result<Self, ValidationError> {
        let flag = Self {
            short,
            long: long.trim_start_matches('-').to_string(),
            long_abbrev: None,
            takes_argument,
        };
        flag.validate()?;
        Ok(flag)
    }

    /// Attaches an explicit abbreviation for the long form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLongAbbrev`] for empty values or
    /// values containing whitespace or `-`.
    pub fn with_long_abbrev(mut self, abbrev: &str) -> Result<Self, ValidationError> {
        self.long_abbrev = Some(abbrev.to_string());
        self.validate()?;
        Ok(self)
    }

    /// Checks the field combination.
    ///
    /// Deserialized flags bypass the constructors, so tree loading calls this
    /// for every flag.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.long.trim().is_empty() {
            return Err(ValidationError::MissingLongForm);
        }
        if self.long.chars().any(|c| c.is_whitespace()) || self.long.starts_with('-') {
            return Err(ValidationError::InvalidLongForm(self.long.clone()));
        }
        if let Some(short) = self.short {
            if !short.is_ascii_alphanumeric() {
                return Err(ValidationError::InvalidShortForm(short.to_string()));
            }
        }
        if let Some(abbrev) = &self.long_abbrev {
            if abbrev.is_empty() || abbrev.chars().any(|c| c.is_whitespace() || c == '-') {
                return Err(ValidationError::InvalidLongAbbrev(abbrev.clone()));
            }
        }
        Ok(())
    }

    /// Returns the short form as typed on the command line (`-d`).
    pub fn short_flag(&self) -> Option<String> {
        self.short.map(|c| format!("-{c}"))
    }

    /// Returns the long form as typed on the command line (`--detach`).
    pub fn long_flag(&self) -> String {
        format!("--{}", self.long)
    }

    /// Checks if this flag matches a given string (`-d`, `--detach`, `detach`).
    pub fn matches(&self, s: &str) -> bool {
        self.short_flag().as_deref() == Some(s) || self.long_flag() == s || self.long == s
    }
}

/// One command in the discovered hierarchy.
///
/// Nodes live in a [`CommandTree`](crate::CommandTree) arena keyed by their
/// space-joined path. The parent is stored as a key and children as local
/// names, so no node owns another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    /// Local command token (e.g. `build`).
    pub name: String,
    /// Tokens from the root binary to this node (e.g. `["docker", "image", "build"]`).
    pub path: Vec<String>,
    /// Key of the parent node; `None` for the root.
    pub parent: Option<String>,
    /// Child command names, sorted.
    pub subcommands: Vec<String>,
    /// Flags accepted by this command, sorted by long form.
    pub params: Vec<FlagDescriptor>,
    /// Assigned abbreviation, unset until resolved.
    pub abbrev: Option<String>,
    /// Set when the abbreviation came from the predefined table.
    pub locked: bool,
}

impl CommandNode {
    pub(crate) fn new(path: Vec<String>, parent: Option<String>) -> Self {
        Self {
            name: path.last().cloned().unwrap_or_default(),
            path,
            parent,
            subcommands: Vec::new(),
            params: Vec::new(),
            abbrev: None,
            locked: false,
        }
    }

    /// Returns the arena key, i.e. the full command line (`docker image build`).
    pub fn key(&self) -> String {
        self.path.join(" ")
    }

    /// Returns `true` for the node representing the binary itself.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the arena key of the named child.
    pub fn child_key(&self, name: &str) -> String {
        format!("{} {name}", self.key())
    }
}

/// Distinguishes command aliases from flag-combination aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasKind {
    /// Expands to a bare command.
    Command,
    /// Expands to a command with appended flags.
    Flags,
}

/// One row of the alias table.
///
/// # Examples
///
/// ```
/// use command_alias_core::{AliasEntry, AliasKind};
///
/// let entry = AliasEntry::command("db", "docker build");
/// assert_eq!(entry.kind, AliasKind::Command);
/// assert_eq!(entry.source, "docker build");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// The unique key the user types.
    pub abbrev: String,
    /// Command line the abbreviation expands to.
    pub command: String,
    /// Key of the originating [`CommandNode`].
    pub source: String,
    /// Whether the entry carries flags.
    pub kind: AliasKind,
}

impl AliasEntry {
    /// Creates a command alias whose expansion is the node key itself.
    pub fn command(abbrev: &str, source: &str) -> Self {
        Self {
            abbrev: abbrev.to_string(),
            command: source.to_string(),
            source: source.to_string(),
            kind: AliasKind::Command,
        }
    }

    /// Creates a flag-combination alias.
    pub fn flags(abbrev: &str, command: &str, source: &str) -> Self {
        Self {
            abbrev: abbrev.to_string(),
            command: command.to_string(),
            source: source.to_string(),
            kind: AliasKind::Flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_descriptor_strips_leading_dashes() {
        let flag = FlagDescriptor::boolean(Some('a'), "--all").unwrap();
        assert_eq!(flag.long, "all");
        assert!(flag.matches("-a"));
        assert!(flag.matches("--all"));
        assert!(!flag.matches("-b"));
    }

    #[test]
    fn test_flag_descriptor_rejects_bad_short_form() {
        let err = FlagDescriptor::boolean(Some('-'), "dash").unwrap_err();
        assert_eq!(err, ValidationError::InvalidShortForm("-".to_string()));
    }

    #[test]
    fn test_flag_descriptor_rejects_bad_long_abbrev() {
        let flag = FlagDescriptor::boolean(None, "no-cache").unwrap();
        assert!(flag.clone().with_long_abbrev("nc").is_ok());
        assert!(flag.clone().with_long_abbrev("").is_err());
        assert!(flag.with_long_abbrev("n-c").is_err());
    }

    #[test]
    fn test_command_node_keys() {
        let node = CommandNode::new(
            vec!["docker".into(), "image".into()],
            Some("docker".into()),
        );
        assert_eq!(node.name, "image");
        assert_eq!(node.key(), "docker image");
        assert_eq!(node.child_key("ls"), "docker image ls");
        assert!(!node.is_root());
    }
}
