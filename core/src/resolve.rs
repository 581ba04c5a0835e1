//! Command abbreviation resolver.
//!
//! Assigns every command node an abbreviation that is unique across the
//! table and starts with its parent's abbreviation. The root and predefined
//! commands are locked first; everything else is drained from a work queue
//! ordered by path tokens, so parents resolve before their children and
//! shorter sibling names before longer ones.
//!
//! A node grows its candidate one character at a time. When a candidate is
//! held by an unlocked competitor the two grow in lockstep; as soon as their
//! candidates diverge the node takes its own and the competitor is pushed to
//! its next free candidate, rewriting the prefix of its whole subtree. A node
//! that runs out of characters evicts the unlocked holder of its full name,
//! which loses its subtree's abbreviations and goes back on the queue.
//!
//! The queue settles most trees. When it gets stuck, every unlocked command
//! is reassigned by a backtracking search that always picks the command with
//! the fewest free candidates next. A failed search means no assignment
//! exists.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::config::AliasConfig;
use crate::error::{AliasError, Result, Warning};
use crate::table::AliasTable;
use crate::tree::CommandTree;
use crate::types::{AliasEntry, CommandNode};
use crate::validate::ValidationError;

/// Queue passes allowed per command before resolution is declared stuck.
const PASSES_PER_NODE: usize = 8;

/// Candidates the backtracking search may try before it gives up.
const SEARCH_STEPS: usize = 100_000;

/// Locks the root and every predefined command found in the tree.
///
/// Predefined abbreviations are suffixes of the root abbreviation. Nested
/// entries must sit under a predefined parent and extend its abbreviation,
/// so locked nodes never depend on a prefix that could move.
///
/// # Errors
///
/// Fails on invalid or duplicate predefined entries and on nested entries
/// that break the prefix chain. Missing commands are returned as warnings.
pub fn seed_predefined(
    tree: &mut CommandTree,
    table: &mut AliasTable,
    config: &AliasConfig,
) -> Result<Vec<Warning>> {
    config.validate()?;

    let root_key = tree.root_key().to_string();
    let root_abbrev = config.root_abbrev_for(&root_key);
    lock(tree, table, &root_key, &root_abbrev)?;

    let mut entries: Vec<(Vec<&str>, &String)> = config
        .predefined
        .iter()
        .map(|(path, suffix)| (path.split_whitespace().collect(), suffix))
        .collect();
    entries.sort();

    let mut warnings = Vec::new();
    for (tokens, suffix) in entries {
        let key = tree.key_for(&tokens.join(" "));
        let abbrev = format!("{root_abbrev}{suffix}");
        if tokens.is_empty() {
            return Err(AliasError::InvalidPredefined {
                command: key,
                abbrev,
            });
        }

        let Some(node) = tree.get(&key) else {
            warn!(command = %key, "Skipping predefined abbreviation for missing command");
            warnings.push(Warning::MissingPredefined { command: key });
            continue;
        };

        if let Some(parent_key) = node.parent.as_deref().filter(|p| *p != root_key) {
            let Some(prefix) = tree
                .get(parent_key)
                .filter(|p| p.locked)
                .and_then(|p| p.abbrev.clone())
            else {
                return Err(AliasError::PredefinedParentMissing {
                    command: key.clone(),
                    parent: parent_key.to_string(),
                });
            };
            if !abbrev.starts_with(&prefix) {
                return Err(AliasError::PredefinedBreaksPrefix {
                    command: key,
                    abbrev,
                    parent: prefix,
                });
            }
        }

        lock(tree, table, &key, &abbrev)?;
    }

    Ok(warnings)
}

fn lock(tree: &mut CommandTree, table: &mut AliasTable, key: &str, abbrev: &str) -> Result<()> {
    if let Err(occupied) = table.claim(AliasEntry::command(abbrev, key)) {
        return Err(AliasError::DuplicatePredefined {
            abbrev: abbrev.to_string(),
            first: occupied.existing.source,
            second: key.to_string(),
        });
    }
    if let Some(node) = tree.get_mut(key) {
        node.abbrev = Some(abbrev.to_string());
        node.locked = true;
    }
    debug!(command = %key, abbrev = %abbrev, "Locked abbreviation");
    Ok(())
}

/// Resolves every unlocked command of the tree into `table`.
///
/// Run [`seed_predefined`] first so the root has its abbreviation.
///
/// # Errors
///
/// Returns [`NoAbbreviation`](AliasError::NoAbbreviation) when no unique
/// assignment exists, and
/// [`PassBudgetExceeded`](AliasError::PassBudgetExceeded) when the search
/// runs out of steps.
pub fn resolve_commands(tree: &mut CommandTree, table: &mut AliasTable) -> Result<()> {
    let seeded = table.clone();
    match Resolver::new(tree, table).run() {
        Err(
            err @ (AliasError::NoAbbreviation { .. }
            | AliasError::EvictionCycle { .. }
            | AliasError::PassBudgetExceeded { .. }),
        ) => {
            debug!(error = %err, "Queue resolution stuck, searching");
            *table = seeded;
            Search::new(tree, table).run()
        }
        result => result,
    }
}

enum Owner {
    Locked,
    Unlocked(String),
}

/// Work-queue state for one resolution run.
struct Resolver<'a> {
    tree: &'a mut CommandTree,
    table: &'a mut AliasTable,
    /// Candidates two commands were seen to share; avoided unless a command
    /// has no characters left.
    conflicts: BTreeSet<String>,
    queue: BTreeSet<Vec<String>>,
    evictions: HashSet<(String, String)>,
}

impl<'a> Resolver<'a> {
    fn new(tree: &'a mut CommandTree, table: &'a mut AliasTable) -> Self {
        let queue = tree
            .nodes()
            .filter(|node| !node.locked && node.abbrev.is_none())
            .map(|node| node.path.clone())
            .collect();
        Self {
            tree,
            table,
            conflicts: BTreeSet::new(),
            queue,
            evictions: HashSet::new(),
        }
    }

    fn run(mut self) -> Result<()> {
        let passes = self.tree.len().saturating_mul(PASSES_PER_NODE).max(1);
        let mut used = 0usize;

        while let Some(path) = self.queue.pop_first() {
            if used == passes {
                return Err(AliasError::PassBudgetExceeded { passes });
            }
            used += 1;

            let key = path.join(" ");
            if self.node(&key)?.abbrev.is_some() {
                continue;
            }
            self.resolve_node(&key)?;
        }

        debug!(
            commands = self.tree.len(),
            passes = used,
            conflicts = self.conflicts.len(),
            "Resolved command abbreviations"
        );
        Ok(())
    }

    fn resolve_node(&mut self, key: &str) -> Result<()> {
        let prefix = self
            .tree
            .parent_abbrev(key)
            .ok_or_else(|| AliasError::UnresolvedParent(key.to_string()))?;
        let name: Vec<char> = self.node(key)?.name.chars().collect();
        let base = prefix.chars().count();
        let mut rival: Option<String> = None;

        for i in 1..=name.len() {
            let candidate: String = prefix.chars().chain(name[..i].iter().copied()).collect();
            let last = i == name.len();

            if let Some(rival_key) = rival.take() {
                match self.candidate(&rival_key, base + i) {
                    // The rival is spelled out and keeps the contested string.
                    None => {}
                    Some(next) if next == candidate => {
                        self.conflicts.insert(candidate.clone());
                        if !last {
                            rival = Some(rival_key);
                            continue;
                        }
                    }
                    Some(next) => {
                        if !self.held_outside(&candidate, &rival_key) {
                            debug!(
                                command = %key,
                                abbrev = %candidate,
                                competitor = %rival_key,
                                competitor_next = %next,
                                "Compromise reached"
                            );
                            // Pushing the rival frees the candidate if one of
                            // its descendants holds it.
                            self.push(&rival_key, base + i)?;
                            return self.claim(key, &candidate);
                        }
                    }
                }
            }

            match self.owner(&candidate) {
                None => {
                    if last || !self.conflicts.contains(&candidate) {
                        return self.claim(key, &candidate);
                    }
                }
                Some(Owner::Locked) => {}
                Some(Owner::Unlocked(owner)) => {
                    if last {
                        return self.force(key, &candidate, &owner);
                    }
                    self.conflicts.insert(candidate);
                    rival = Some(owner);
                }
            }
        }

        Err(AliasError::NoAbbreviation {
            command: key.to_string(),
        })
    }

    /// Candidate of `key` with a total length of `len` characters, or `None`
    /// when its name is too short or its parent is unresolved.
    fn candidate(&self, key: &str, len: usize) -> Option<String> {
        let node = self.tree.get(key)?;
        let prefix = self.tree.parent_abbrev(key)?;
        let take = len.checked_sub(prefix.chars().count())?;
        if take == 0 || take > node.name.chars().count() {
            return None;
        }
        Some(prefix.chars().chain(node.name.chars().take(take)).collect())
    }

    fn owner(&self, abbrev: &str) -> Option<Owner> {
        let entry = self.table.get(abbrev)?;
        match self.tree.get(&entry.source) {
            Some(node) if !node.locked => Some(Owner::Unlocked(entry.source.clone())),
            _ => Some(Owner::Locked),
        }
    }

    /// Returns `true` when `abbrev` is held by a command outside the subtree
    /// rooted at `root`.
    fn held_outside(&self, abbrev: &str, root: &str) -> bool {
        let Some(entry) = self.table.get(abbrev) else {
            return false;
        };
        let mut current = Some(entry.source.as_str());
        while let Some(key) = current {
            if key == root {
                return false;
            }
            current = self.tree.get(key).and_then(|node| node.parent.as_deref());
        }
        true
    }

    fn node(&self, key: &str) -> Result<&CommandNode> {
        self.tree
            .get(key)
            .ok_or_else(|| ValidationError::UnknownCommand(key.to_string()).into())
    }

    fn claim(&mut self, key: &str, abbrev: &str) -> Result<()> {
        if self.table.claim(AliasEntry::command(abbrev, key)).is_err() {
            return Err(AliasError::NoAbbreviation {
                command: key.to_string(),
            });
        }
        if let Some(node) = self.tree.get_mut(key) {
            node.abbrev = Some(abbrev.to_string());
        }
        Ok(())
    }

    /// Moves a competitor to its first free candidate of at least `from_len`
    /// characters, or re-queues it when none is left.
    fn push(&mut self, key: &str, from_len: usize) -> Result<()> {
        let Some(old) = self.node(key)?.abbrev.clone() else {
            return Ok(());
        };

        let mut len = from_len;
        while let Some(candidate) = self.candidate(key, len) {
            let last = self.candidate(key, len + 1).is_none();
            if !self.table.contains(&candidate) && (last || !self.conflicts.contains(&candidate)) {
                debug!(command = %key, from = %old, to = %candidate, "Pushed competitor");
                return self.relocate(key, &old, &candidate);
            }
            len += 1;
        }

        debug!(command = %key, abbrev = %old, "Competitor has no free candidate left");
        self.evict(key);
        Ok(())
    }

    /// Gives `key` the abbreviation `new` and rewrites the `old` prefix of
    /// every resolved descendant. Descendants whose rewritten abbreviation is
    /// taken lose theirs, together with their own subtrees.
    fn relocate(&mut self, key: &str, old: &str, new: &str) -> Result<()> {
        let previous: Vec<(String, Option<String>, Option<String>)> = self
            .tree
            .subtree_keys(key)
            .into_iter()
            .filter_map(|k| {
                let node = self.tree.get(&k)?;
                Some((k, node.parent.clone(), node.abbrev.clone()))
            })
            .collect();

        for (_, _, abbrev) in &previous {
            if let Some(abbrev) = abbrev {
                self.table.remove(abbrev);
            }
        }

        let mut dropped: HashSet<String> = HashSet::new();
        for (k, parent, abbrev) in previous {
            let parent_dropped = parent.is_some_and(|p| dropped.contains(&p));
            let rewritten = abbrev
                .as_deref()
                .and_then(|a| a.strip_prefix(old))
                .map(|rest| format!("{new}{rest}"));

            match rewritten {
                Some(abbrev) if !parent_dropped && !self.table.contains(&abbrev) => {
                    self.claim(&k, &abbrev)?;
                }
                _ => {
                    if let Some(node) = self.tree.get_mut(&k) {
                        node.abbrev = None;
                        self.queue.insert(node.path.clone());
                    }
                    dropped.insert(k);
                }
            }
        }
        Ok(())
    }

    /// Takes `candidate` from its unlocked holder; the holder's subtree goes
    /// back on the queue.
    fn force(&mut self, key: &str, candidate: &str, owner: &str) -> Result<()> {
        if self.candidate(owner, candidate.chars().count() + 1).is_none() {
            return Err(AliasError::NoAbbreviation {
                command: key.to_string(),
            });
        }
        if !self
            .evictions
            .insert((key.to_string(), owner.to_string()))
        {
            return Err(AliasError::EvictionCycle {
                evictor: key.to_string(),
                evicted: owner.to_string(),
            });
        }

        debug!(command = %key, abbrev = %candidate, evicted = %owner, "Forced abbreviation");
        self.evict(owner);
        self.claim(key, candidate)
    }

    fn evict(&mut self, key: &str) {
        for k in self.tree.subtree_keys(key) {
            let Some(node) = self.tree.get_mut(&k) else {
                continue;
            };
            if node.locked {
                continue;
            }
            if let Some(abbrev) = node.abbrev.take() {
                self.table.remove(&abbrev);
            }
            self.queue.insert(node.path.clone());
        }
    }
}

/// Backtracking assignment of every unlocked command.
struct Search<'a> {
    tree: &'a mut CommandTree,
    table: &'a mut AliasTable,
    pending: BTreeSet<Vec<String>>,
    steps: usize,
    /// Last command found without a free candidate.
    stuck: Option<String>,
}

impl<'a> Search<'a> {
    fn new(tree: &'a mut CommandTree, table: &'a mut AliasTable) -> Self {
        let pending: BTreeSet<Vec<String>> = tree
            .nodes()
            .filter(|node| !node.locked)
            .map(|node| node.path.clone())
            .collect();
        for path in &pending {
            if let Some(node) = tree.get_mut(&path.join(" ")) {
                node.abbrev = None;
            }
        }
        Self {
            tree,
            table,
            pending,
            steps: 0,
            stuck: None,
        }
    }

    fn run(mut self) -> Result<()> {
        if self.assign_next()? {
            debug!(steps = self.steps, "Search resolved command abbreviations");
            return Ok(());
        }
        Err(AliasError::NoAbbreviation {
            command: self.stuck.unwrap_or_default(),
        })
    }

    fn assign_next(&mut self) -> Result<bool> {
        if self.pending.is_empty() {
            return Ok(true);
        }
        let (path, candidates) = self.most_constrained()?;
        let key = path.join(" ");
        if candidates.is_empty() {
            self.stuck = Some(key);
            return Ok(false);
        }

        self.pending.remove(&path);
        for candidate in candidates {
            self.steps += 1;
            if self.steps > SEARCH_STEPS {
                return Err(AliasError::PassBudgetExceeded {
                    passes: SEARCH_STEPS,
                });
            }
            if self.table.claim(AliasEntry::command(&candidate, &key)).is_err() {
                continue;
            }
            self.set_abbrev(&key, Some(candidate.clone()));
            if self.assign_next()? {
                return Ok(true);
            }
            self.table.remove(&candidate);
            self.set_abbrev(&key, None);
        }
        self.pending.insert(path);
        Ok(false)
    }

    /// Pending command with a resolved parent and the fewest free
    /// candidates, first in path order on ties.
    fn most_constrained(&self) -> Result<(Vec<String>, Vec<String>)> {
        let mut best: Option<(Vec<String>, Vec<String>)> = None;
        for path in &self.pending {
            let Some(candidates) = self.free_candidates(&path.join(" ")) else {
                continue;
            };
            if best.as_ref().is_none_or(|(_, b)| candidates.len() < b.len()) {
                let done = candidates.is_empty();
                best = Some((path.clone(), candidates));
                if done {
                    break;
                }
            }
        }
        best.ok_or_else(|| {
            let first = self.pending.first().map(|p| p.join(" ")).unwrap_or_default();
            AliasError::UnresolvedParent(first)
        })
    }

    /// Untaken candidates of `key`, shortest first; `None` while its parent
    /// is unresolved.
    fn free_candidates(&self, key: &str) -> Option<Vec<String>> {
        let prefix = self.tree.parent_abbrev(key)?;
        let name = &self.tree.get(key)?.name;
        let candidates = name
            .char_indices()
            .map(|(i, c)| format!("{prefix}{}", &name[..i + c.len_utf8()]))
            .filter(|candidate| !self.table.contains(candidate))
            .collect();
        Some(candidates)
    }

    fn set_abbrev(&mut self, key: &str, abbrev: Option<String>) {
        if let Some(node) = self.tree.get_mut(key) {
            node.abbrev = abbrev;
        }
    }
}

/// Abbreviation of every resolved command, keyed by command key.
pub fn command_abbrevs(tree: &CommandTree) -> BTreeMap<String, String> {
    tree.nodes()
        .filter_map(|node| Some((node.key(), node.abbrev.clone()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::tree::CommandSpec;

    fn tree(root: &str, commands: &[&str]) -> CommandTree {
        let mut tree = CommandTree::new(root).unwrap();
        for command in commands {
            let mut parent = tree.root_key().to_string();
            for token in command.split_whitespace() {
                let key = format!("{parent} {token}");
                if !tree.contains(&key) {
                    tree.add_command(&parent, token).unwrap();
                }
                parent = key;
            }
        }
        tree
    }

    fn resolve(tree: &mut CommandTree, config: &AliasConfig) -> Result<BTreeMap<String, String>> {
        let mut table = AliasTable::new();
        seed_predefined(tree, &mut table, config)?;
        resolve_commands(tree, &mut table)?;
        Ok(command_abbrevs(tree))
    }

    fn abbrev<'m>(abbrevs: &'m BTreeMap<String, String>, key: &str) -> &'m str {
        abbrevs.get(key).map(String::as_str).unwrap_or_default()
    }

    #[test]
    fn test_distinct_initials_get_single_letters() {
        let mut tree = tree("docker", &["build", "run"]);
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();

        assert_eq!(abbrev(&abbrevs, "docker"), "d");
        assert_eq!(abbrev(&abbrevs, "docker build"), "db");
        assert_eq!(abbrev(&abbrevs, "docker run"), "dr");
    }

    #[test]
    fn test_start_stop_compromise() {
        let mut tree = tree("docker", &["start", "stop"]);
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();

        assert_eq!(abbrev(&abbrevs, "docker start"), "dsta");
        assert_eq!(abbrev(&abbrevs, "docker stop"), "dsto");
    }

    #[test]
    fn test_shared_prefix_names() {
        let mut tree = tree("x", &["build", "builder", "buildx"]);
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();

        assert_eq!(abbrev(&abbrevs, "x build"), "xb");
        assert_eq!(abbrev(&abbrevs, "x builder"), "xbuilde");
        assert_eq!(abbrev(&abbrevs, "x buildx"), "xbuildx");
    }

    #[test]
    fn test_locked_owner_is_skipped() {
        let mut tree = tree("x", &["build", "builder"]);
        let mut config = AliasConfig::default();
        config.predefined.insert("build".into(), "b".into());

        let abbrevs = resolve(&mut tree, &config).unwrap();
        assert_eq!(abbrev(&abbrevs, "x build"), "xb");
        assert_eq!(abbrev(&abbrevs, "x builder"), "xbu");
        assert!(tree.get("x build").unwrap().locked);
        assert!(!tree.get("x builder").unwrap().locked);
    }

    #[test]
    fn test_push_propagates_to_descendants() {
        let mut tree = tree("docker", &["start now", "stop"]);
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();

        assert_eq!(abbrev(&abbrevs, "docker start"), "dsta");
        assert_eq!(abbrev(&abbrevs, "docker start now"), "dstan");
        assert_eq!(abbrev(&abbrevs, "docker stop"), "dsto");
    }

    #[test]
    fn test_forced_resolution_evicts_and_requeues_competitor() {
        let mut tree = tree("x", &["a bcd", "ab"]);
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();

        assert_eq!(abbrev(&abbrevs, "x a"), "xa");
        assert_eq!(abbrev(&abbrevs, "x ab"), "xab");
        assert_eq!(abbrev(&abbrevs, "x a bcd"), "xabc");
    }

    fn assert_valid(tree: &CommandTree, abbrevs: &BTreeMap<String, String>) {
        assert_eq!(abbrevs.len(), tree.len());
        let unique: HashSet<&String> = abbrevs.values().collect();
        assert_eq!(unique.len(), abbrevs.len(), "duplicate abbreviation in {abbrevs:?}");
        for node in tree.nodes() {
            if let Some(parent) = &node.parent {
                let own = &abbrevs[&node.key()];
                assert!(own.starts_with(&abbrevs[parent]) && own.len() > abbrevs[parent].len());
            }
        }
    }

    #[test]
    fn test_compromise_moves_competitor_descendant_off_candidate() {
        let mut tree = tree("x", &["ba c", "bc"]);
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();

        assert_eq!(abbrev(&abbrevs, "x ba"), "xba");
        assert_eq!(abbrev(&abbrevs, "x ba c"), "xbac");
        assert_eq!(abbrev(&abbrevs, "x bc"), "xbc");
    }

    #[test]
    fn test_nested_compromises_settle() {
        let mut tree = tree("x", &["bab", "baa cc", "baa cbba cbb", "baa a a"]);
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();

        assert_eq!(abbrev(&abbrevs, "x bab"), "xbab");
        assert_eq!(abbrev(&abbrevs, "x baa"), "xbaa");
        assert_eq!(abbrev(&abbrevs, "x baa a"), "xbaaa");
        assert_eq!(abbrev(&abbrevs, "x baa a a"), "xbaaaa");
        assert_eq!(abbrev(&abbrevs, "x baa cbba"), "xbaacb");
        assert_eq!(abbrev(&abbrevs, "x baa cbba cbb"), "xbaacbc");
        assert_eq!(abbrev(&abbrevs, "x baa cc"), "xbaacc");
    }

    #[test]
    fn test_search_resolves_tree_stuck_on_short_names() {
        let mut tree = tree(
            "x",
            &["ab", "ac", "ca aa a", "ca aaa aaca", "ca aaa aba", "ca aaab", "ccbc"],
        );
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();
        assert_valid(&tree, &abbrevs);
    }

    #[test]
    fn test_search_resolves_tree_with_repeated_evictions() {
        let mut tree = tree(
            "x",
            &[
                "b",
                "bbbb",
                "cb aacc",
                "cb b aabb",
                "cb b abca",
                "cb b caac",
                "cb bc ca",
                "cb bc ccc",
                "cc",
            ],
        );
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();
        assert_valid(&tree, &abbrevs);
    }

    #[test]
    fn test_identical_spellings_are_fatal() {
        let mut tree = tree("x", &["a b", "ab"]);
        let err = resolve(&mut tree, &AliasConfig::default()).unwrap_err();
        assert!(matches!(err, AliasError::NoAbbreviation { ref command } if command == "x ab"));
    }

    #[test]
    fn test_locked_full_name_is_fatal() {
        let mut tree = tree("x", &["a", "zzz"]);
        let mut config = AliasConfig::default();
        config.predefined.insert("zzz".into(), "a".into());

        let err = resolve(&mut tree, &config).unwrap_err();
        assert!(matches!(err, AliasError::NoAbbreviation { ref command } if command == "x a"));
    }

    #[test]
    fn test_missing_predefined_is_a_warning() {
        let mut tree = tree("docker", &["run"]);
        let mut table = AliasTable::new();
        let mut config = AliasConfig::default();
        config.predefined.insert("app".into(), "a".into());

        let warnings = seed_predefined(&mut tree, &mut table, &config).unwrap();
        assert_eq!(
            warnings,
            vec![Warning::MissingPredefined {
                command: "docker app".to_string()
            }]
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_nested_predefined_must_extend_parent() {
        let mut tree = tree("docker", &["image ls"]);
        let mut config = AliasConfig::default();
        config.predefined.insert("image".into(), "img".into());
        config.predefined.insert("image ls".into(), "ils".into());
        let err = resolve(&mut tree.clone(), &config).unwrap_err();
        assert!(matches!(err, AliasError::PredefinedBreaksPrefix { .. }));

        config.predefined.insert("image ls".into(), "imgl".into());
        let abbrevs = resolve(&mut tree, &config).unwrap();
        assert_eq!(abbrev(&abbrevs, "docker image ls"), "dimgl");
    }

    #[test]
    fn test_nested_predefined_needs_predefined_parent() {
        let mut tree = tree("docker", &["image ls"]);
        let mut config = AliasConfig::default();
        config.predefined.insert("image ls".into(), "il".into());

        let err = resolve(&mut tree, &config).unwrap_err();
        assert!(matches!(
            err,
            AliasError::PredefinedParentMissing { ref parent, .. } if parent == "docker image"
        ));
    }

    #[test]
    fn test_children_extend_parent_abbrev() {
        let spec = CommandSpec::new("docker")
            .with_subcommand(
                CommandSpec::new("image")
                    .with_subcommand(CommandSpec::new("ls"))
                    .with_subcommand(CommandSpec::new("load")),
            )
            .with_subcommand(CommandSpec::new("images"));
        let mut tree = CommandTree::from_spec(&spec).unwrap();
        let abbrevs = resolve(&mut tree, &AliasConfig::default()).unwrap();

        for node in tree.nodes() {
            if let Some(parent) = &node.parent {
                assert!(abbrevs[&node.key()].starts_with(&abbrevs[parent]));
            }
        }
    }

    /// Exhaustive check: can every command get a unique abbreviation that
    /// extends its parent's?
    fn solvable(tree: &CommandTree) -> bool {
        fn assign(
            nodes: &[(String, String, Vec<char>)],
            abbrevs: &mut HashMap<String, String>,
            used: &mut HashSet<String>,
        ) -> bool {
            let Some(((key, parent, name), rest)) = nodes.split_first() else {
                return true;
            };
            let prefix = abbrevs[parent].clone();
            for len in 1..=name.len() {
                let candidate: String = prefix.chars().chain(name[..len].iter().copied()).collect();
                if !used.insert(candidate.clone()) {
                    continue;
                }
                abbrevs.insert(key.clone(), candidate.clone());
                if assign(rest, abbrevs, used) {
                    return true;
                }
                used.remove(&candidate);
            }
            false
        }

        // Key order puts every parent before its children.
        let nodes: Vec<(String, String, Vec<char>)> = tree
            .nodes()
            .filter_map(|node| Some((node.key(), node.parent.clone()?, node.name.chars().collect())))
            .collect();
        let root = tree.root_key().to_string();
        let mut abbrevs = HashMap::from([(root.clone(), root.clone())]);
        let mut used = HashSet::from([root]);
        assign(&nodes, &mut abbrevs, &mut used)
    }

    proptest! {
        #[test]
        fn prop_resolution_is_valid_or_tree_is_unsolvable(
            commands in prop::collection::vec(prop::collection::vec("[abc]{1,4}", 1..=3), 1..10)
        ) {
            let paths: Vec<String> = commands.iter().map(|tokens| tokens.join(" ")).collect();
            let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
            let mut tree = tree("x", &paths);

            match resolve(&mut tree, &AliasConfig::default()) {
                Ok(abbrevs) => {
                    prop_assert_eq!(abbrevs.len(), tree.len());
                    let unique: HashSet<&String> = abbrevs.values().collect();
                    prop_assert_eq!(unique.len(), abbrevs.len());
                    for node in tree.nodes() {
                        if let Some(parent) = &node.parent {
                            let own = &abbrevs[&node.key()];
                            prop_assert!(own.starts_with(&abbrevs[parent]));
                            prop_assert!(own.len() > abbrevs[parent].len());
                        }
                    }
                }
                Err(err) => {
                    prop_assert!(matches!(err, AliasError::NoAbbreviation { .. }), "{}", err);
                    prop_assert!(!solvable(&tree), "solvable tree rejected: {:?}", paths);
                }
            }
        }
    }
}
