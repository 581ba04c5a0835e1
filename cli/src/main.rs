mod output;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use command_alias_core::{AliasConfig, CommandTree, create_aliases};
use command_alias_discovery::{DiscoverConfig, discover_tree};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, format_resolution};

/// Serialization format for discovered trees.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum TreeFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "create-aliases", version)]
#[command(about = "Generate unique hierarchical shell aliases for a CLI's commands")]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Discover a binary's commands and print aliases for them.
    Generate(GenerateArgs),
    /// Discover a binary's command tree and print it.
    Discover(DiscoverArgs),
    /// Print a built-in configuration preset as YAML.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Binary to generate aliases for (defaults to the root of --tree).
    #[arg(required_unless_present = "tree")]
    binary: Option<String>,
    /// Read the command tree from a JSON or YAML file instead of probing.
    #[arg(long)]
    tree: Option<PathBuf>,
    #[command(flatten)]
    config: ConfigSource,
    /// Output format.
    #[arg(long, default_value = "shell")]
    format: OutputFormat,
    /// Maximum flags per generated combination (0 disables flag aliases).
    #[arg(long)]
    max_flags: Option<usize>,
    /// Longest long-flag name usable inside an alias.
    #[arg(long)]
    max_long_flag_len: Option<usize>,
    /// Abbreviate hyphenated long flags by their initials (--no-cache → nc).
    #[arg(long)]
    hyphen_initialism: bool,
    /// Rename the bare root alias (e.g. dk for docker).
    #[arg(long)]
    root_alias: Option<String>,
    /// Ignore predefined abbreviations and flag presets.
    #[arg(long)]
    no_predefined: bool,
    #[command(flatten)]
    probe: ProbeArgs,
}

#[derive(Debug, Args)]
struct DiscoverArgs {
    /// Binary to probe.
    binary: String,
    #[command(flatten)]
    config: ConfigSource,
    /// Output format for the tree.
    #[arg(long, default_value = "json")]
    format: TreeFormat,
    /// Write the tree to a file instead of stdout (format from extension).
    #[arg(long)]
    output: Option<PathBuf>,
    #[command(flatten)]
    probe: ProbeArgs,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Preset name (docker, default).
    preset: String,
    /// Write the preset to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ConfigSource {
    /// YAML configuration file.
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,
    /// Built-in preset (defaults to the one named after the binary, if any).
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Debug, Args)]
struct ProbeArgs {
    /// Environment override for help probes (KEY=VALUE, repeatable).
    #[arg(long = "env", value_parser = parse_env_pair)]
    env: Vec<(String, String)>,
    /// Deepest command level to probe.
    #[arg(long)]
    max_depth: Option<usize>,
    /// Per-probe timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Number of parallel probes (default: number of CPUs, at most 8).
    #[arg(long)]
    jobs: Option<usize>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Discover(args) => run_discover(args),
        Command::Config(args) => run_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn load_config(source: &ConfigSource, binary: &str) -> Result<AliasConfig, String> {
    if let Some(path) = &source.config {
        return AliasConfig::load(path)
            .map_err(|e| format!("failed to load config {}: {e}", path.display()));
    }
    match &source.preset {
        Some(name) => AliasConfig::preset(name).ok_or_else(|| unknown_preset(name)),
        None => Ok(AliasConfig::preset(binary).unwrap_or_default()),
    }
}

fn unknown_preset(name: &str) -> String {
    format!("unknown preset '{name}' (available: docker, default)")
}

fn discover_config(
    binary: &str,
    env: &BTreeMap<String, String>,
    probe: &ProbeArgs,
) -> DiscoverConfig {
    let mut config = DiscoverConfig::new(binary)
        .with_env(env.clone())
        .with_env(probe.env.iter().cloned());
    if let Some(max_depth) = probe.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(timeout_ms) = probe.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.jobs = probe.jobs;
    config
}

fn discover(binary: &str, config: &AliasConfig, probe: &ProbeArgs) -> Result<CommandTree, String> {
    let discover_config = discover_config(binary, &config.env, probe);
    let outcome = discover_tree(&discover_config)
        .map_err(|e| format!("failed to discover commands of '{binary}': {e}"))?;
    for warning in &outcome.warnings {
        debug!(warning = %warning, "Discovery warning");
    }
    eprintln!(
        "Discovered {} commands with {} probes ({} warnings)",
        outcome.tree.len(),
        outcome.probes,
        outcome.warnings.len()
    );
    Ok(outcome.tree)
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let loaded = match &args.tree {
        Some(path) => Some(
            CommandTree::load(path)
                .map_err(|e| format!("failed to load tree {}: {e}", path.display()))?,
        ),
        None => None,
    };

    let binary = match (&args.binary, &loaded) {
        (Some(binary), Some(tree)) if binary != tree.root_key() => {
            return Err(format!(
                "tree root '{}' does not match binary '{binary}'",
                tree.root_key()
            ));
        }
        (Some(binary), _) => binary.clone(),
        (None, Some(tree)) => tree.root_key().to_string(),
        (None, None) => return Err("a binary or --tree is required".to_string()),
    };

    let mut config = load_config(&args.config, &binary)?;
    if args.no_predefined {
        config.predefined.clear();
        config.flag_presets.clear();
    }
    if let Some(max) = args.max_flags {
        config.max_flags_per_combination = max;
    }
    if let Some(len) = args.max_long_flag_len {
        config.max_long_flag_len = len;
    }
    if args.hyphen_initialism {
        config.hyphen_initialism = true;
    }
    if let Some(alias) = args.root_alias {
        config.root_alias = Some(alias);
    }

    let mut tree = match loaded {
        Some(tree) => tree,
        None => discover(&binary, &config, &args.probe)?,
    };

    let resolution = create_aliases(&mut tree, &config).map_err(|e| e.to_string())?;
    let rendered = format_resolution(&resolution, args.format)?;
    print!("{rendered}");

    let collisions = resolution
        .warnings
        .iter()
        .filter(|w| w.is_flag_collision())
        .count();
    eprintln!(
        "Generated {} aliases for {} commands ({} warnings, {} flag collisions)",
        resolution.entries.len(),
        resolution.command_count(),
        resolution.warnings.len() - collisions,
        collisions
    );
    Ok(())
}

fn run_discover(args: DiscoverArgs) -> Result<(), String> {
    let config = load_config(&args.config, &args.binary)?;
    let tree = discover(&args.binary, &config, &args.probe)?;

    if let Some(path) = &args.output {
        tree.save(path)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        eprintln!("Wrote command tree to {}", path.display());
        return Ok(());
    }

    let spec = tree.to_spec();
    let rendered = match args.format {
        TreeFormat::Json => serde_json::to_string_pretty(&spec)
            .map(|json| json + "\n")
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        TreeFormat::Yaml => {
            serde_yaml::to_string(&spec).map_err(|e| format!("YAML serialization failed: {e}"))?
        }
    };
    print!("{rendered}");
    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<(), String> {
    let config = AliasConfig::preset(&args.preset).ok_or_else(|| unknown_preset(&args.preset))?;

    match &args.output {
        Some(path) => {
            config
                .save(path)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!("Wrote preset '{}' to {}", args.preset, path.display());
        }
        None => {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| format!("YAML serialization failed: {e}"))?;
            print!("{yaml}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_pair() {
        assert_eq!(
            parse_env_pair("NO_COLOR=1"),
            Ok(("NO_COLOR".to_string(), "1".to_string()))
        );
        assert_eq!(
            parse_env_pair("EMPTY="),
            Ok(("EMPTY".to_string(), String::new()))
        );
        assert!(parse_env_pair("=1").is_err());
        assert!(parse_env_pair("NOVALUE").is_err());
    }

    #[test]
    fn test_config_defaults_to_binary_preset() {
        let source = ConfigSource {
            config: None,
            preset: None,
        };
        assert_eq!(load_config(&source, "docker").unwrap(), AliasConfig::docker());
        assert_eq!(load_config(&source, "kubectl").unwrap(), AliasConfig::default());
    }

    #[test]
    fn test_unknown_preset_is_an_error() {
        let source = ConfigSource {
            config: None,
            preset: Some("podman".into()),
        };
        assert!(load_config(&source, "docker").unwrap_err().contains("podman"));
    }

    #[test]
    fn test_probe_args_override_discovery_defaults() {
        let probe = ProbeArgs {
            env: vec![("A".into(), "cli".into())],
            max_depth: Some(1),
            timeout_ms: None,
            jobs: Some(2),
        };
        let env = BTreeMap::from([
            ("A".to_string(), "config".to_string()),
            ("B".to_string(), "config".to_string()),
        ]);
        let config = discover_config("docker", &env, &probe);

        assert_eq!(config.env["A"], "cli");
        assert_eq!(config.env["B"], "config");
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.jobs, Some(2));
        assert_eq!(config.timeout_ms, DiscoverConfig::default().timeout_ms);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
