//! Flag combination expander.
//!
//! Adds aliases for bounded flag combinations on top of the resolved command
//! aliases. Combinations are order-respecting subsequences of a command's
//! eligible flags (sorted by long name), so `-di` is generated but `-id` is
//! not. A combination holds at most one value-taking flag, placed last so its
//! value can follow the alias. Claims never displace existing entries: the
//! first claim wins and later collisions are reported as warnings.

use tracing::{debug, warn};

use crate::config::AliasConfig;
use crate::error::Warning;
use crate::table::AliasTable;
use crate::tree::CommandTree;
use crate::types::{AliasEntry, FlagDescriptor};

/// How a flag is spelled inside an alias and on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagCode {
    /// Letters appended to the command abbreviation.
    pub code: String,
    /// Whether the command line uses the short or the long form.
    pub token: FlagToken,
    /// Whether the flag consumes a value.
    pub takes_argument: bool,
}

/// Command-line spelling of one flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagToken {
    /// `-d`, clustered with neighbouring short flags.
    Short(char),
    /// `--rm`.
    Long(String),
}

/// Encodes a flag for use in aliases, or returns `None` when it has no
/// short enough spelling.
///
/// Precedence: short form, configured override, the flag's own long-form
/// abbreviation, hyphen initials (when enabled), the long form itself (when
/// short enough).
///
/// # Examples
///
/// ```
/// use command_alias_core::{AliasConfig, FlagDescriptor, flag_code};
///
/// let config = AliasConfig::default();
/// let rm = FlagDescriptor::boolean(None, "rm").unwrap();
/// assert_eq!(flag_code(&rm, &config).unwrap().code, "rm");
///
/// let name = FlagDescriptor::with_value(None, "name").unwrap();
/// assert!(flag_code(&name, &config).is_none());
/// ```
pub fn flag_code(flag: &FlagDescriptor, config: &AliasConfig) -> Option<FlagCode> {
    let long = || FlagToken::Long(flag.long.clone());
    let (code, token) = if let Some(short) = flag.short {
        (short.to_string(), FlagToken::Short(short))
    } else if let Some(abbrev) = config.long_flag_abbrevs.get(&flag.long) {
        (abbrev.clone(), long())
    } else if let Some(abbrev) = &flag.long_abbrev {
        (abbrev.clone(), long())
    } else if config.hyphen_initialism && flag.long.contains('-') {
        (initials(&flag.long), long())
    } else if flag.long.chars().count() <= config.max_long_flag_len {
        (flag.long.clone(), long())
    } else {
        return None;
    };

    if code.is_empty() {
        return None;
    }
    Some(FlagCode {
        code,
        token,
        takes_argument: flag.takes_argument,
    })
}

fn initials(long: &str) -> String {
    long.split('-')
        .filter_map(|part| part.chars().next())
        .collect()
}

/// Index sets of every non-empty subsequence of `len` items with at most
/// `max` members, smaller sets first.
pub fn combinations(len: usize, max: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    for size in 1..=max.min(len) {
        let mut indices: Vec<usize> = (0..size).collect();
        loop {
            out.push(indices.clone());

            // Advance the rightmost index that still has room.
            let Some(pos) = (0..size).rev().find(|&i| indices[i] < len - size + i) else {
                break;
            };
            indices[pos] += 1;
            for i in pos + 1..size {
                indices[i] = indices[i - 1] + 1;
            }
        }
    }
    out
}

/// Renders flag tokens for the command line, clustering consecutive short
/// flags (`-di --rm`).
pub fn render_flags<'a>(tokens: impl IntoIterator<Item = &'a FlagToken>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut cluster = String::new();
    for token in tokens {
        match token {
            FlagToken::Short(c) => cluster.push(*c),
            FlagToken::Long(long) => {
                if !cluster.is_empty() {
                    parts.push(format!("-{}", std::mem::take(&mut cluster)));
                }
                parts.push(format!("--{long}"));
            }
        }
    }
    if !cluster.is_empty() {
        parts.push(format!("-{cluster}"));
    }
    parts.join(" ")
}

/// Adds flag presets and generated flag combinations to `table`.
///
/// Command entries are never touched. Every dropped candidate is returned
/// as a [`Warning::FlagAliasCollision`] or [`Warning::SkippedFlagPreset`].
pub fn expand_flags(
    tree: &CommandTree,
    table: &mut AliasTable,
    config: &AliasConfig,
) -> Vec<Warning> {
    let mut warnings = apply_presets(tree, table, config);
    if config.max_flags_per_combination == 0 {
        return warnings;
    }

    let before = table.len();
    for node in tree.nodes() {
        let Some(abbrev) = &node.abbrev else {
            continue;
        };
        let codes: Vec<FlagCode> = node
            .params
            .iter()
            .filter_map(|flag| flag_code(flag, config))
            .collect();
        if codes.is_empty() {
            continue;
        }

        let key = node.key();
        for combo in combinations(codes.len(), config.max_flags_per_combination) {
            let picked: Vec<&FlagCode> = combo.iter().map(|&i| &codes[i]).collect();
            if picked.iter().filter(|c| c.takes_argument).count() > 1 {
                continue;
            }
            let ordered: Vec<&FlagCode> = picked
                .iter()
                .filter(|c| !c.takes_argument)
                .chain(picked.iter().filter(|c| c.takes_argument))
                .copied()
                .collect();

            let alias: String = std::iter::once(abbrev.as_str())
                .chain(ordered.iter().map(|c| c.code.as_str()))
                .collect();
            let command = format!("{key} {}", render_flags(ordered.iter().map(|c| &c.token)));
            claim(table, AliasEntry::flags(&alias, &command, &key), &mut warnings);
        }
    }

    debug!(
        added = table.len() - before,
        dropped = warnings.iter().filter(|w| w.is_flag_collision()).count(),
        "Expanded flag combinations"
    );
    warnings
}

fn apply_presets(tree: &CommandTree, table: &mut AliasTable, config: &AliasConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let root_abbrev = tree.root().abbrev.clone().unwrap_or_default();

    for preset in &config.flag_presets {
        let key = tree.key_for(&preset.command);
        let reason = if !tree.contains(&key) {
            Some("command not found in tree")
        } else if preset.flags.is_empty() || preset.abbrev.trim().is_empty() {
            Some("preset needs flags and an abbreviation")
        } else {
            None
        };
        if let Some(reason) = reason {
            warn!(command = %key, reason, "Skipping flag preset");
            warnings.push(Warning::SkippedFlagPreset {
                command: key,
                reason: reason.to_string(),
            });
            continue;
        }

        let alias = format!("{root_abbrev}{}", preset.abbrev.trim());
        let command = format!("{key} {}", preset.flags.join(" "));
        claim(table, AliasEntry::flags(&alias, &command, &key), &mut warnings);
    }

    warnings
}

fn claim(table: &mut AliasTable, entry: AliasEntry, warnings: &mut Vec<Warning>) {
    if let Err(occupied) = table.claim(entry) {
        debug!(
            abbrev = %occupied.rejected.abbrev,
            dropped = %occupied.rejected.command,
            existing = %occupied.existing.command,
            "Dropping colliding flag alias"
        );
        warnings.push(Warning::FlagAliasCollision {
            abbrev: occupied.rejected.abbrev,
            dropped: occupied.rejected.command,
            existing: occupied.existing.command,
        });
    }
}
