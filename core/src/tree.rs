//! Arena-backed command tree.
//!
//! Nodes are stored in a [`BTreeMap`] keyed by their space-joined path, so
//! iteration order is deterministic and independent of insertion order.
//! Parent links and child lists are keys and names rather than owning
//! pointers; walks over a subtree resolve children through the map.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{CommandNode, FlagDescriptor};
use crate::validate::{ValidationError, validate_flags};

/// Nested interchange form of a command tree.
///
/// This is what discovery dumps and what `--tree` files contain. It reads
/// and writes as JSON or YAML.
///
/// # Examples
///
/// ```
/// use command_alias_core::{CommandSpec, CommandTree};
///
/// let spec: CommandSpec = serde_json::from_str(r#"{
///     "name": "docker",
///     "subcommands": [
///         { "name": "run", "flags": [{ "short": "d", "long": "detach" }] }
///     ]
/// }"#).unwrap();
///
/// let tree = CommandTree::from_spec(&spec).unwrap();
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.get("docker run").unwrap().params[0].long, "detach");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Local command token.
    pub name: String,
    /// Flags accepted by this command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagDescriptor>,
    /// Nested commands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandSpec>,
}

impl CommandSpec {
    /// Creates a spec with no flags or children.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a flag.
    pub fn with_flag(mut self, flag: FlagDescriptor) -> Self {
        self.flags.push(flag);
        self
    }

    /// Adds a nested command.
    pub fn with_subcommand(mut self, sub: CommandSpec) -> Self {
        self.subcommands.push(sub);
        self
    }
}

/// The full command hierarchy of one binary.
#[derive(Debug, Clone)]
pub struct CommandTree {
    root: String,
    nodes: BTreeMap<String, CommandNode>,
}

impl CommandTree {
    /// Creates a tree containing only the root binary.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `binary` is empty or not a single token.
    pub fn new(binary: &str) -> std::result::Result<Self, ValidationError> {
        let binary = check_name(binary)?;
        let mut nodes = BTreeMap::new();
        nodes.insert(
            binary.to_string(),
            CommandNode::new(vec![binary.to_string()], None),
        );
        Ok(Self {
            root: binary.to_string(),
            nodes,
        })
    }

    /// Builds a tree from its nested interchange form.
    ///
    /// # Errors
    ///
    /// Fails on empty or multi-token names, duplicate siblings, and invalid
    /// or duplicate flags.
    pub fn from_spec(spec: &CommandSpec) -> std::result::Result<Self, ValidationError> {
        let mut tree = Self::new(&spec.name)?;
        let root = tree.root.clone();
        tree.insert_spec(&root, spec)?;
        Ok(tree)
    }

    fn insert_spec(
        &mut self,
        key: &str,
        spec: &CommandSpec,
    ) -> std::result::Result<(), ValidationError> {
        self.set_params(key, spec.flags.clone())?;
        for sub in &spec.subcommands {
            let child = self.add_command(key, &sub.name)?;
            self.insert_spec(&child, sub)?;
        }
        Ok(())
    }

    /// Converts the tree back into its nested interchange form.
    pub fn to_spec(&self) -> CommandSpec {
        self.spec_for(&self.root)
    }

    fn spec_for(&self, key: &str) -> CommandSpec {
        let Some(node) = self.nodes.get(key) else {
            return CommandSpec::default();
        };
        CommandSpec {
            name: node.name.clone(),
            flags: node.params.clone(),
            subcommands: node
                .subcommands
                .iter()
                .map(|child| self.spec_for(&node.child_key(child)))
                .collect(),
        }
    }

    /// Loads a tree from a JSON or YAML file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns I/O, parse, or [`InvalidTree`](crate::AliasError::InvalidTree)
    /// errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let spec: CommandSpec = if is_yaml(path) {
            serde_yaml::from_reader(reader)?
        } else {
            serde_json::from_reader(reader)?
        };
        Ok(Self::from_spec(&spec)?)
    }

    /// Saves the tree as JSON or YAML, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns I/O or serialization errors.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        let spec = self.to_spec();
        if is_yaml(path) {
            serde_yaml::to_writer(writer, &spec)?;
        } else {
            serde_json::to_writer_pretty(writer, &spec)?;
        }
        Ok(())
    }

    /// Adds a child command and returns its key.
    ///
    /// # Errors
    ///
    /// Fails if the parent does not exist, the name is invalid, or the
    /// parent already has a child with that name.
    pub fn add_command(
        &mut self,
        parent_key: &str,
        name: &str,
    ) -> std::result::Result<String, ValidationError> {
        let name = check_name(name)?;
        let parent = self
            .nodes
            .get_mut(parent_key)
            .ok_or_else(|| ValidationError::UnknownCommand(parent_key.to_string()))?;
        let key = parent.child_key(name);
        match parent.subcommands.binary_search_by(|c| c.as_str().cmp(name)) {
            Ok(_) => return Err(ValidationError::DuplicateSubcommand(key)),
            Err(pos) => parent.subcommands.insert(pos, name.to_string()),
        }
        let mut path = parent.path.clone();
        path.push(name.to_string());
        self.nodes.insert(
            key.clone(),
            CommandNode::new(path, Some(parent_key.to_string())),
        );
        Ok(key)
    }

    /// Replaces the flags of a command, sorted by long form.
    ///
    /// # Errors
    ///
    /// Fails if the command does not exist or a flag is invalid or duplicated.
    pub fn set_params(
        &mut self,
        key: &str,
        mut params: Vec<FlagDescriptor>,
    ) -> std::result::Result<(), ValidationError> {
        if let Some(err) = validate_flags(key, &params).into_iter().next() {
            return Err(err);
        }
        let node = self
            .nodes
            .get_mut(key)
            .ok_or_else(|| ValidationError::UnknownCommand(key.to_string()))?;
        params.sort_by(|a, b| a.long.cmp(&b.long));
        node.params = params;
        Ok(())
    }

    /// Removes a command and its whole subtree. The root cannot be removed.
    ///
    /// Returns the number of removed nodes, or `None` if `key` is unknown or
    /// the root.
    pub fn remove_subtree(&mut self, key: &str) -> Option<usize> {
        let node = self.nodes.get(key)?;
        let parent_key = node.parent.clone()?;
        let name = node.name.clone();
        let keys = self.subtree_keys(key);
        for k in &keys {
            self.nodes.remove(k);
        }
        if let Some(parent) = self.nodes.get_mut(&parent_key) {
            parent.subcommands.retain(|c| *c != name);
        }
        Some(keys.len())
    }

    /// Returns the root node key (the binary name).
    pub fn root_key(&self) -> &str {
        &self.root
    }

    /// Returns the root node.
    pub fn root(&self) -> &CommandNode {
        // The root is inserted by the constructor and never removed.
        &self.nodes[&self.root]
    }

    /// Looks up a node by full key.
    pub fn get(&self, key: &str) -> Option<&CommandNode> {
        self.nodes.get(key)
    }

    /// Looks up a node by full key, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut CommandNode> {
        self.nodes.get_mut(key)
    }

    /// Looks up a node by its path below the root (`"image ls"`).
    ///
    /// An empty path names the root. Repeated whitespace is ignored.
    pub fn find(&self, relative: &str) -> Option<&CommandNode> {
        self.nodes.get(&self.key_for(relative))
    }

    /// Builds the full key for a path below the root.
    pub fn key_for(&self, relative: &str) -> String {
        std::iter::once(self.root.as_str())
            .chain(relative.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns `true` if the key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of commands, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in key order.
    pub fn nodes(&self) -> impl Iterator<Item = &CommandNode> {
        self.nodes.values()
    }

    /// Keys of the direct children of `key`.
    pub fn children(&self, key: &str) -> Vec<String> {
        self.nodes
            .get(key)
            .map(|node| {
                node.subcommands
                    .iter()
                    .map(|child| node.child_key(child))
                    .filter(|child| self.nodes.contains_key(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keys of `key` and all its descendants, parents before children.
    pub fn subtree_keys(&self, key: &str) -> Vec<String> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(key) {
            return out;
        }
        let mut stack = vec![key.to_string()];
        while let Some(current) = stack.pop() {
            let mut children = self.children(&current);
            children.reverse();
            stack.extend(children);
            out.push(current);
        }
        out
    }

    /// Prefix the parent of `key` imposes on it: empty for the root, `None`
    /// while the parent is unresolved.
    pub fn parent_abbrev(&self, key: &str) -> Option<String> {
        let node = self.nodes.get(key)?;
        match &node.parent {
            None => Some(String::new()),
            Some(parent) => self.nodes.get(parent)?.abbrev.clone(),
        }
    }

    /// Clears every assigned abbreviation and lock.
    pub fn clear_abbrevs(&mut self) {
        for node in self.nodes.values_mut() {
            node.abbrev = None;
            node.locked = false;
        }
    }
}

fn check_name(name: &str) -> std::result::Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyCommandName);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidCommandName(trimmed.to_string()));
    }
    Ok(trimmed)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}
