//! Output formatting for alias sets.

use command_alias_core::{AliasKind, Resolution};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `alias dr='docker run'` lines for sourcing.
    Shell,
    Json,
    Yaml,
    Table,
}

/// Formats a resolution in the requested output format.
pub fn format_resolution(resolution: &Resolution, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Shell => Ok(to_shell(resolution)),
        OutputFormat::Json => serde_json::to_string_pretty(resolution)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => serde_yaml::to_string(resolution)
            .map_err(|e| format!("YAML serialization failed: {e}")),
        OutputFormat::Table => Ok(to_table(resolution)),
    }
}

/// Quotes `value` for a POSIX shell using single quotes.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn to_shell(resolution: &Resolution) -> String {
    let mut out = String::new();
    for (abbrev, command) in resolution.pairs() {
        out.push_str(&format!("alias {abbrev}={}\n", shell_quote(command)));
    }
    out
}

fn to_table(resolution: &Resolution) -> String {
    let width = resolution
        .entries
        .iter()
        .map(|entry| entry.abbrev.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut out = format!("{:<width$}  {:<7}  COMMAND\n", "ALIAS", "KIND");
    for entry in &resolution.entries {
        let kind = match entry.kind {
            AliasKind::Command => "command",
            AliasKind::Flags => "flags",
        };
        out.push_str(&format!(
            "{:<width$}  {kind:<7}  {}\n",
            entry.abbrev, entry.command
        ));
    }
    out
}
