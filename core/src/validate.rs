//! Command tree validation.
//!
//! Validates the structural invariants of a [`CommandTree`] before the
//! resolver runs: command names are non-empty single tokens, parent and child
//! links agree, and no command declares the same flag twice.
//!
//! # Examples
//!
//! ```
//! use command_alias_core::*;
//!
//! let mut tree = CommandTree::new("docker").unwrap();
//! tree.add_command("docker", "run").unwrap();
//! assert!(validate_tree(&tree).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{CommandTree, FlagDescriptor};

/// Tree and flag validation errors.
///
/// Each variant describes a specific structural problem. The `Display` impl
/// provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Command name contains whitespace and cannot be used as a path token.
    #[error("command name must be a single token: {0}")]
    InvalidCommandName(String),
    /// A flag has no long form.
    #[error("flag must define a long form")]
    MissingLongForm,
    /// Long form contains whitespace or leading dashes.
    #[error("invalid long flag format: {0}")]
    InvalidLongForm(String),
    /// Short form is not a single alphanumeric character.
    #[error("invalid short flag format: {0}")]
    InvalidShortForm(String),
    /// Long-form abbreviation is empty or contains separators.
    #[error("invalid long flag abbreviation: {0}")]
    InvalidLongAbbrev(String),
    /// Two flags on the same command share a name.
    #[error("duplicate flag on '{command}': {flag}")]
    DuplicateFlag { command: String, flag: String },
    /// Two children of the same command share a name.
    #[error("duplicate subcommand: {0}")]
    DuplicateSubcommand(String),
    /// A key does not exist in the tree.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    /// A child's parent link does not point back at the listing parent.
    #[error("broken parent link at: {0}")]
    BrokenParentLink(String),
}

/// Validates a command tree.
///
/// Returns every problem found; an empty vector means the tree is usable.
pub fn validate_tree(tree: &CommandTree) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for node in tree.nodes() {
        let key = node.key();
        if node.name.trim().is_empty() {
            errors.push(ValidationError::EmptyCommandName);
            continue;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for child in &node.subcommands {
            if !seen.insert(child.as_str()) {
                errors.push(ValidationError::DuplicateSubcommand(node.child_key(child)));
                continue;
            }
            let child_key = node.child_key(child);
            match tree.get(&child_key) {
                None => errors.push(ValidationError::UnknownCommand(child_key)),
                Some(child_node) if child_node.parent.as_deref() != Some(key.as_str()) => {
                    errors.push(ValidationError::BrokenParentLink(child_key));
                }
                Some(_) => {}
            }
        }

        errors.extend(validate_flags(&key, &node.params));
    }

    errors
}

/// Validates the flags of one command.
pub fn validate_flags(command: &str, flags: &[FlagDescriptor]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for flag in flags {
        if let Err(err) = flag.validate() {
            errors.push(err);
            continue;
        }
        if !seen.insert(flag.long_flag()) {
            errors.push(ValidationError::DuplicateFlag {
                command: command.to_string(),
                flag: flag.long_flag(),
            });
        }
        if let Some(short) = flag.short_flag() {
            if !seen.insert(short.clone()) {
                errors.push(ValidationError::DuplicateFlag {
                    command: command.to_string(),
                    flag: short,
                });
            }
        }
    }

    errors
}
