//! Breadth-first command tree discovery.
//!
//! The root's help is probed first; every following level of the tree is
//! probed in parallel on a bounded [`rayon`] pool. Children are attached in
//! sorted order, so the resulting tree does not depend on probe timing.

use std::collections::BTreeMap;
use std::time::Duration;

use command_alias_core::{CommandTree, FlagDescriptor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DiscoverError, Result};
use crate::parser::parse_help;
use crate::probe::{DEFAULT_TIMEOUT, probe_help};

/// Default number of command levels probed below the root.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Default cap on help probes per discovery run.
pub const DEFAULT_PROBE_BUDGET: usize = 4096;

/// Settings for one discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverConfig {
    /// Binary to probe (`docker`).
    pub binary: String,
    /// Extra environment for every probe.
    pub env: BTreeMap<String, String>,
    /// Argument appended to each command path.
    pub help_flag: String,
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,
    /// Deepest command level that is still probed; deeper commands are kept
    /// as leaves.
    pub max_depth: usize,
    /// Maximum number of probes, root included.
    pub probe_budget: usize,
    /// Worker threads; `None` picks a default from the CPU count.
    pub jobs: Option<usize>,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            binary: String::new(),
            env: BTreeMap::new(),
            help_flag: "--help".to_string(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            max_depth: DEFAULT_MAX_DEPTH,
            probe_budget: DEFAULT_PROBE_BUDGET,
            jobs: None,
        }
    }
}

impl DiscoverConfig {
    /// Creates a configuration for `binary` with default limits.
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
            ..Self::default()
        }
    }

    /// Adds environment overrides.
    pub fn with_env(mut self, env: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(env);
        self
    }

    /// Per-probe timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn argv(&self, path: &[String]) -> Vec<String> {
        let mut argv = path.to_vec();
        argv.push(self.help_flag.clone());
        argv
    }
}

/// Result of a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoverOutcome {
    /// The discovered tree, root included.
    pub tree: CommandTree,
    /// Probe failures and skipped subtrees.
    pub warnings: Vec<String>,
    /// Number of help probes run.
    pub probes: usize,
}

/// Discovers the command tree of `config.binary` by running it.
///
/// # Errors
///
/// Fails if the root help cannot be probed or the worker pool cannot be
/// built. Failures below the root are reported as warnings.
pub fn discover_tree(config: &DiscoverConfig) -> Result<DiscoverOutcome> {
    let timeout = config.timeout();
    discover_with(config, |argv| probe_help(argv, &config.env, timeout))
}

/// Discovers a command tree using `probe` to fetch help text for an argv.
///
/// [`discover_tree`] passes [`probe_help`]; tests and offline callers pass
/// canned output.
///
/// # Errors
///
/// Same as [`discover_tree`].
pub fn discover_with<F>(config: &DiscoverConfig, probe: F) -> Result<DiscoverOutcome>
where
    F: Fn(&[String]) -> Result<String> + Sync,
{
    let mut tree = CommandTree::new(&config.binary)?;
    let root_key = tree.root_key().to_string();
    let mut warnings = Vec::new();

    let root_help = probe(&config.argv(&[root_key.clone()]))?;
    let root = parse_help(&root_help);
    let mut params = root.flags;
    params.extend(root.global_flags);
    let mut frontier = attach(&mut tree, &root_key, params, root.commands)?;
    let mut probes = 1usize;

    let jobs = config
        .jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(default_parallel_jobs);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|err| DiscoverError::ThreadPool(err.to_string()))?;

    let mut depth = 1usize;
    while !frontier.is_empty() {
        if depth > config.max_depth {
            warn!(max_depth = config.max_depth, skipped = frontier.len(), "Reached maximum depth");
            warnings.push(format!(
                "Reached maximum depth ({}); {} commands kept without probing",
                config.max_depth,
                frontier.len()
            ));
            break;
        }
        let remaining = config.probe_budget.saturating_sub(probes);
        if frontier.len() > remaining {
            warn!(
                probe_budget = config.probe_budget,
                skipped = frontier.len() - remaining,
                "Reached probe budget"
            );
            warnings.push(format!(
                "Reached probe budget ({}); {} commands kept without probing",
                config.probe_budget,
                frontier.len() - remaining
            ));
            frontier.truncate(remaining);
            if frontier.is_empty() {
                break;
            }
        }

        let level: Vec<(String, Vec<String>)> = frontier
            .iter()
            .filter_map(|key| Some((key.clone(), tree.get(key)?.path.clone())))
            .collect();
        debug!(depth, commands = level.len(), "Probing command level");

        let results: Vec<(String, Result<String>)> = pool.install(|| {
            level
                .par_iter()
                .map(|(key, path)| (key.clone(), probe(&config.argv(path))))
                .collect()
        });
        probes += results.len();

        let mut next = Vec::new();
        for (key, result) in results {
            let help = match result {
                Ok(help) => help,
                Err(err) => {
                    warn!(command = %key, error = %err, "Help probe failed");
                    warnings.push(format!("{key}: {err}"));
                    continue;
                }
            };

            let parsed = parse_help(&help);
            let mut commands = parsed.commands;
            let name = tree.get(&key).map(|node| node.name.clone()).unwrap_or_default();
            if commands.contains(&name) {
                warnings.push(format!(
                    "Skipping nested commands for '{key}' due to detected self-cycle"
                ));
                commands.clear();
            }
            next.extend(attach(&mut tree, &key, parsed.flags, commands)?);
        }

        frontier = next;
        depth += 1;
    }

    info!(
        binary = %root_key,
        commands = tree.len(),
        probes,
        warnings = warnings.len(),
        "Discovered command tree"
    );
    Ok(DiscoverOutcome {
        tree,
        warnings,
        probes,
    })
}

fn attach(
    tree: &mut CommandTree,
    key: &str,
    params: Vec<FlagDescriptor>,
    commands: Vec<String>,
) -> Result<Vec<String>> {
    tree.set_params(key, params)?;
    let mut children = commands
        .iter()
        .map(|name| tree.add_command(key, name))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    children.sort();
    Ok(children)
}

fn default_parallel_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4)
        .clamp(1, 8)
}
