//! The alias table: abbreviation → entry.
//!
//! The table is the single owner of abbreviation keys during a run. It is
//! passed explicitly through the resolver and the flag expander, never held
//! in global state, so every run starts from an empty table.

use std::collections::BTreeMap;

use crate::types::AliasEntry;

/// Rejected claim: the entry already holding the key and the one turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupied {
    pub existing: AliasEntry,
    pub rejected: AliasEntry,
}

/// Injective mapping from abbreviation to [`AliasEntry`].
///
/// # Examples
///
/// ```
/// use command_alias_core::{AliasEntry, AliasTable};
///
/// let mut table = AliasTable::new();
/// table.claim(AliasEntry::command("db", "docker build")).unwrap();
///
/// let occupied = table
///     .claim(AliasEntry::command("db", "docker builder"))
///     .unwrap_err();
/// assert_eq!(occupied.existing.command, "docker build");
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: BTreeMap<String, AliasEntry>,
}

impl AliasTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry` unless its key is taken.
    ///
    /// # Errors
    ///
    /// Returns both entries when the key is already present; the table is
    /// left unchanged.
    pub fn claim(&mut self, entry: AliasEntry) -> Result<(), Box<Occupied>> {
        if let Some(existing) = self.entries.get(&entry.abbrev) {
            return Err(Box::new(Occupied {
                existing: existing.clone(),
                rejected: entry,
            }));
        }
        self.entries.insert(entry.abbrev.clone(), entry);
        Ok(())
    }

    /// Removes and returns the entry for `abbrev`.
    pub fn remove(&mut self, abbrev: &str) -> Option<AliasEntry> {
        self.entries.remove(abbrev)
    }

    /// Moves an entry to a new key.
    ///
    /// Returns the entry occupying `to` if the rename is refused. A missing
    /// `from` key is a no-op.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), Box<AliasEntry>> {
        if from == to {
            return Ok(());
        }
        if let Some(existing) = self.entries.get(to) {
            return Err(Box::new(existing.clone()));
        }
        if let Some(mut entry) = self.entries.remove(from) {
            entry.abbrev = to.to_string();
            self.entries.insert(to.to_string(), entry);
        }
        Ok(())
    }

    /// Looks up an entry.
    pub fn get(&self, abbrev: &str) -> Option<&AliasEntry> {
        self.entries.get(abbrev)
    }

    /// Returns `true` if `abbrev` is taken.
    pub fn contains(&self, abbrev: &str) -> bool {
        self.entries.contains_key(abbrev)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in abbreviation order.
    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.values()
    }

    /// Consumes the table into entries sorted by expanded command, then
    /// abbreviation, for stable diffable output.
    pub fn into_sorted(self) -> Vec<AliasEntry> {
        let mut entries: Vec<AliasEntry> = self.entries.into_values().collect();
        entries.sort_by(|a, b| a.command.cmp(&b.command).then(a.abbrev.cmp(&b.abbrev)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_refuses_taken_key() {
        let mut table = AliasTable::new();
        table.claim(AliasEntry::command("d", "docker")).unwrap();
        table.claim(AliasEntry::command("dk", "docker kill")).unwrap();

        let existing = table.rename("d", "dk").unwrap_err();
        assert_eq!(existing.command, "docker kill");
        assert_eq!(table.get("d").unwrap().command, "docker");
    }

    #[test]
    fn test_rename_moves_entry() {
        let mut table = AliasTable::new();
        table.claim(AliasEntry::command("d", "docker")).unwrap();
        table.rename("d", "dkr").unwrap();

        assert!(!table.contains("d"));
        assert_eq!(table.get("dkr").unwrap().abbrev, "dkr");
    }

    #[test]
    fn test_into_sorted_orders_by_command() {
        let mut table = AliasTable::new();
        table.claim(AliasEntry::command("a", "docker run")).unwrap();
        table.claim(AliasEntry::command("b", "docker build")).unwrap();
        table
            .claim(AliasEntry::flags("c", "docker build -q", "docker build"))
            .unwrap();

        let commands: Vec<String> = table.into_sorted().into_iter().map(|e| e.command).collect();
        assert_eq!(commands, vec!["docker build", "docker build -q", "docker run"]);
    }
}
