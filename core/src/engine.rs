//! End-to-end alias generation for one command tree.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AliasConfig;
use crate::error::{AliasError, Result, Warning};
use crate::flags::expand_flags;
use crate::resolve::{resolve_commands, seed_predefined};
use crate::table::AliasTable;
use crate::tree::CommandTree;
use crate::types::{AliasEntry, AliasKind};

/// Result of a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    /// Aliases sorted by expanded command, then abbreviation.
    pub entries: Vec<AliasEntry>,
    /// Non-fatal conditions in the order they were found.
    pub warnings: Vec<Warning>,
}

impl Resolution {
    /// `(abbreviation, full command)` pairs in output order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.abbrev.as_str(), entry.command.as_str()))
    }

    /// Number of command aliases, flag aliases excluded.
    pub fn command_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.kind == AliasKind::Command)
            .count()
    }
}

/// Generates every alias for `tree`.
///
/// Legacy commands are pruned first, then predefined abbreviations are
/// locked, the remaining commands resolved, flag combinations expanded, and
/// finally the root entry renamed to [`AliasConfig::root_alias`]. Previous
/// abbreviations on the tree are discarded, so repeated runs start fresh.
///
/// # Errors
///
/// Returns an [`AliasError`] for configuration mistakes, commands that
/// cannot be abbreviated, and a root alias that is already taken.
///
/// # Examples
///
/// ```
/// use command_alias_core::{AliasConfig, CommandSpec, CommandTree, create_aliases};
///
/// let spec = CommandSpec::new("docker")
///     .with_subcommand(CommandSpec::new("start"))
///     .with_subcommand(CommandSpec::new("stop"));
/// let mut tree = CommandTree::from_spec(&spec).unwrap();
///
/// let resolution = create_aliases(&mut tree, &AliasConfig::default()).unwrap();
/// let pairs: Vec<_> = resolution.pairs().collect();
/// assert_eq!(
///     pairs,
///     vec![("d", "docker"), ("dsta", "docker start"), ("dsto", "docker stop")]
/// );
/// ```
pub fn create_aliases(tree: &mut CommandTree, config: &AliasConfig) -> Result<Resolution> {
    let mut warnings = prune_legacy(tree, config);
    tree.clear_abbrevs();

    let mut table = AliasTable::new();
    warnings.extend(seed_predefined(tree, &mut table, config)?);
    resolve_commands(tree, &mut table)?;
    let commands = table.len();

    warnings.extend(expand_flags(tree, &mut table, config));
    remap_root(tree, &mut table, config)?;

    let collisions = warnings.iter().filter(|w| w.is_flag_collision()).count();
    info!(
        binary = %tree.root_key(),
        commands,
        flag_aliases = table.len() - commands,
        collisions,
        "Generated aliases"
    );

    Ok(Resolution {
        entries: table.into_sorted(),
        warnings,
    })
}

fn prune_legacy(tree: &mut CommandTree, config: &AliasConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for path in &config.legacy {
        let key = tree.key_for(path);
        match tree.remove_subtree(&key) {
            Some(removed) => debug!(command = %key, removed, "Pruned legacy command"),
            None => {
                warn!(command = %key, "Legacy command not found in tree");
                warnings.push(Warning::MissingLegacy { command: key });
            }
        }
    }
    warnings
}

fn remap_root(tree: &CommandTree, table: &mut AliasTable, config: &AliasConfig) -> Result<()> {
    let Some(alias) = config.root_alias.as_deref().filter(|a| !a.is_empty()) else {
        return Ok(());
    };
    let Some(current) = tree.root().abbrev.as_deref() else {
        return Ok(());
    };

    table
        .rename(current, alias)
        .map_err(|existing| AliasError::RootAliasCollision {
            alias: alias.to_string(),
            existing: existing.command,
        })?;
    debug!(from = %current, to = %alias, "Remapped root alias");
    Ok(())
}
