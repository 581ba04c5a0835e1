//! Command tree model and abbreviation engine for shell alias generation.
//!
//! This crate turns the command hierarchy of a CLI into a set of short,
//! unique, hierarchical aliases:
//!
//! - [`CommandTree`]: arena of [`CommandNode`]s keyed by full command path,
//!   with a nested [`CommandSpec`] interchange form for JSON and YAML files.
//! - [`FlagDescriptor`]: a validated flag with short and long forms.
//! - [`AliasConfig`]: predefined abbreviations, flag presets, and limits.
//! - [`AliasTable`]: the abbreviation → [`AliasEntry`] mapping built during
//!   a run.
//!
//! [`create_aliases`] runs the whole pipeline: legacy pruning, predefined
//! locks ([`seed_predefined`]), the conflict resolver
//! ([`resolve_commands`]), flag combinations ([`expand_flags`]), and the
//! root remap. Every command alias starts with the alias of its parent, so
//! `docker image ls` might become `dil` when `docker image` is `di`.
//!
//! # Example
//!
//! ```
//! use command_alias_core::*;
//!
//! let spec = CommandSpec::new("docker")
//!     .with_subcommand(CommandSpec::new("build"))
//!     .with_subcommand(CommandSpec::new("builder"))
//!     .with_subcommand(
//!         CommandSpec::new("run")
//!             .with_flag(FlagDescriptor::boolean(Some('d'), "detach").unwrap()),
//!     );
//! let mut tree = CommandTree::from_spec(&spec).unwrap();
//!
//! let mut config = AliasConfig::default();
//! config.predefined.insert("build".into(), "b".into());
//!
//! let resolution = create_aliases(&mut tree, &config).unwrap();
//! let pairs: Vec<_> = resolution.pairs().collect();
//! assert!(pairs.contains(&("db", "docker build")));
//! assert!(pairs.contains(&("dbu", "docker builder")));
//! assert!(pairs.contains(&("drd", "docker run -d")));
//! ```

mod config;
mod engine;
mod error;
mod flags;
mod resolve;
mod table;
mod tree;
mod types;
mod validate;

pub use config::{AliasConfig, DEFAULT_MAX_FLAGS, DEFAULT_MAX_LONG_FLAG_LEN, FlagPreset};
pub use engine::{Resolution, create_aliases};
pub use error::{AliasError, Result, Warning};
pub use flags::{FlagCode, FlagToken, combinations, expand_flags, flag_code, render_flags};
pub use resolve::{command_abbrevs, resolve_commands, seed_predefined};
pub use table::{AliasTable, Occupied};
pub use tree::{CommandSpec, CommandTree};
pub use types::*;
pub use validate::{ValidationError, validate_flags, validate_tree};
