//! Command tree discovery from CLI help output.
//!
//! Builds a [`CommandTree`] for a binary by running `<binary> [path...] --help`
//! for every known command and parsing the command and flag sections of the
//! output.
//!
//! # Main entry points
//!
//! - [`parse_help`]: parse pre-captured help text without running anything.
//! - [`probe_help`]: run one help command with a timeout.
//! - [`discover_tree`]: probe a binary level by level and build its tree.
//! - [`discover_with`]: same, with a caller-supplied probe function.
//!
//! # Example
//!
//! ```
//! use command_alias_discovery::{DiscoverConfig, DiscoverError, discover_with};
//!
//! let outcome = discover_with(&DiscoverConfig::new("tool"), |argv: &[String]| {
//!     match argv.join(" ").as_str() {
//!         "tool --help" => Ok("Commands:\n  run   Run it\n".to_string()),
//!         "tool run --help" => Ok("Options:\n  -q, --quiet   Quiet\n".to_string()),
//!         other => Err(DiscoverError::EmptyOutput { command: other.to_string() }),
//!     }
//! })
//! .unwrap();
//!
//! assert_eq!(outcome.tree.len(), 2);
//! assert_eq!(outcome.tree.get("tool run").unwrap().params[0].long, "quiet");
//! ```
//!
//! [`CommandTree`]: command_alias_core::CommandTree

mod discover;
mod error;
mod parser;
mod probe;

pub use discover::{
    DEFAULT_MAX_DEPTH, DEFAULT_PROBE_BUDGET, DiscoverConfig, DiscoverOutcome, discover_tree,
    discover_with,
};
pub use error::{DiscoverError, Result};
pub use parser::{ParsedHelp, parse_help};
pub use probe::{DEFAULT_TIMEOUT, default_probe_env, probe_help};
