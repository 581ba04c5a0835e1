//! Alias generation configuration.
//!
//! Defines the YAML-serializable configuration holding the predefined
//! abbreviation table, flag-combination limits, and output tweaks.
//!
//! # Example YAML
//!
//! ```yaml
//! root_alias: dk
//! predefined:
//!   build: b
//!   image: img
//!   run: r
//! flag_presets:
//!   - command: run
//!     flags: ["--rm", "-it"]
//!     abbrev: rrm
//! max_flags_per_combination: 3
//! max_long_flag_len: 2
//! hyphen_initialism: true
//! long_flag_abbrevs:
//!   no-cache: nc
//! legacy:
//!   - container ls
//! env:
//!   DOCKER_CLI_EXPERIMENTAL: enabled
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AliasError, Result};

/// Default upper bound on flags per generated combination.
pub const DEFAULT_MAX_FLAGS: usize = 3;

/// Default longest long-flag name usable directly inside an alias.
pub const DEFAULT_MAX_LONG_FLAG_LEN: usize = 2;

/// A hand-picked alias for one command plus flags.
///
/// `abbrev` is a suffix appended to the root abbreviation, like the keys of
/// [`AliasConfig::predefined`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagPreset {
    /// Command path below the root (`"run"`, `"image ls"`); empty for the root.
    #[serde(default)]
    pub command: String,
    /// Flag tokens appended verbatim (`["--rm", "-it"]`).
    pub flags: Vec<String>,
    /// Abbreviation suffix.
    pub abbrev: String,
}

/// Top-level alias configuration.
///
/// Loaded from a YAML file or built from a preset such as
/// [`AliasConfig::docker`].
///
/// # Examples
///
/// ```
/// use command_alias_core::AliasConfig;
///
/// let config = AliasConfig::default();
/// assert_eq!(config.max_flags_per_combination, 3);
/// assert_eq!(config.root_abbrev_for("docker"), "d");
///
/// let docker = AliasConfig::docker();
/// assert_eq!(docker.predefined.get("build").map(String::as_str), Some("b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Internal abbreviation of the binary; defaults to its first character.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_abbrev: Option<String>,
    /// Standalone symbol the bare root alias is renamed to after resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_alias: Option<String>,
    /// Command path below the root → abbreviation suffix.
    pub predefined: BTreeMap<String, String>,
    /// Predefined flag-combination aliases.
    pub flag_presets: Vec<FlagPreset>,
    /// Maximum flags per generated combination (`0` disables flag aliases).
    pub max_flags_per_combination: usize,
    /// Longest long-flag name that may stand in for itself.
    pub max_long_flag_len: usize,
    /// Derive abbreviations for hyphenated long flags from their initials.
    pub hyphen_initialism: bool,
    /// Long flag name → abbreviation overrides.
    pub long_flag_abbrevs: BTreeMap<String, String>,
    /// Command paths dropped with their subtrees before resolution.
    pub legacy: BTreeSet<String>,
    /// Environment overrides used when probing the binary.
    pub env: BTreeMap<String, String>,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            root_abbrev: None,
            root_alias: None,
            predefined: BTreeMap::new(),
            flag_presets: Vec::new(),
            max_flags_per_combination: DEFAULT_MAX_FLAGS,
            max_long_flag_len: DEFAULT_MAX_LONG_FLAG_LEN,
            hyphen_initialism: false,
            long_flag_abbrevs: BTreeMap::new(),
            legacy: BTreeSet::new(),
            env: BTreeMap::new(),
        }
    }
}

impl AliasConfig {
    /// Opinionated preset for `docker`.
    ///
    /// The generic algorithm settles collisions like `start`/`stop` with
    /// compromises (`dsta`, `dsto`); these entries give frequently used
    /// commands shorter aliases up front.
    pub fn docker() -> Self {
        let predefined = [
            ("app", "a"),
            ("build", "b"),
            ("builder", "br"),
            ("buildx", "bx"),
            ("container", "c"),
            ("commit", "cm"),
            ("config", "cf"),
            ("context", "cx"),
            ("exec", "ex"),
            ("image", "img"),
            ("images", "imgs"),
            ("network", "n"),
            ("logs", "l"),
            ("plugin", "p"),
            ("ps", "ps"),
            ("run", "r"),
            ("swarm", "s"),
            ("search", "se"),
            ("service", "svc"),
            ("stack", "st"),
            ("tag", "t"),
            ("start", "sta"),
            ("volume", "v"),
        ]
        .into_iter()
        .map(|(command, abbrev)| (command.to_string(), abbrev.to_string()))
        .collect();

        Self {
            predefined,
            env: BTreeMap::from([(
                "DOCKER_CLI_EXPERIMENTAL".to_string(),
                "enabled".to_string(),
            )]),
            ..Self::default()
        }
    }

    /// Looks up a built-in preset by binary name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "docker" => Some(Self::docker()),
            "none" | "default" => Some(Self::default()),
            _ => None,
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](AliasError::Io) if the file cannot be read, or
    /// [`Yaml`](AliasError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](AliasError::Io) if the file cannot be written, or
    /// [`Yaml`](AliasError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Internal abbreviation of the root binary.
    pub fn root_abbrev_for(&self, binary: &str) -> String {
        match &self.root_abbrev {
            Some(abbrev) if !abbrev.is_empty() => abbrev.clone(),
            _ => binary.chars().next().map(String::from).unwrap_or_default(),
        }
    }

    /// Checks the predefined table without looking at any tree.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPredefined`](AliasError::InvalidPredefined) for empty
    /// or whitespace-containing abbreviations and
    /// [`DuplicatePredefined`](AliasError::DuplicatePredefined) when two
    /// commands ask for the same one.
    pub fn validate(&self) -> Result<()> {
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for (command, abbrev) in &self.predefined {
            if abbrev.is_empty() || abbrev.chars().any(char::is_whitespace) {
                return Err(AliasError::InvalidPredefined {
                    command: command.clone(),
                    abbrev: abbrev.clone(),
                });
            }
            if let Some(first) = owners.insert(abbrev, command) {
                return Err(AliasError::DuplicatePredefined {
                    abbrev: abbrev.clone(),
                    first: first.to_string(),
                    second: command.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_preset_is_valid() {
        assert!(AliasConfig::docker().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_abbrev() {
        let mut config = AliasConfig::default();
        config.predefined.insert("start".into(), "s".into());
        config.predefined.insert("stop".into(), "s".into());

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            AliasError::DuplicatePredefined { ref abbrev, .. } if abbrev == "s"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_abbrev() {
        let mut config = AliasConfig::default();
        config.predefined.insert("start".into(), String::new());
        assert!(matches!(
            config.validate(),
            Err(AliasError::InvalidPredefined { .. })
        ));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AliasConfig = serde_yaml::from_str("predefined:\n  run: r\n").unwrap();
        assert_eq!(config.predefined.len(), 1);
        assert_eq!(config.max_flags_per_combination, DEFAULT_MAX_FLAGS);
        assert_eq!(config.max_long_flag_len, DEFAULT_MAX_LONG_FLAG_LEN);
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.yml");
        let mut config = AliasConfig::docker();
        config.root_alias = Some("dk".into());
        config.save(&path).unwrap();

        let loaded = AliasConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_root_abbrev_defaults_to_first_char() {
        let mut config = AliasConfig::default();
        assert_eq!(config.root_abbrev_for("kubectl"), "k");
        config.root_abbrev = Some("kc".into());
        assert_eq!(config.root_abbrev_for("kubectl"), "kc");
    }
}
