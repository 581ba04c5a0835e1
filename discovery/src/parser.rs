//! Section-based help text parser.
//!
//! Understands the layout cobra-style CLIs such as `docker`, `kubectl`, and
//! `gh` print: unindented headings ending in `:`, followed by indented
//! entries until the next blank line or heading.
//!
//! ```text
//! Management Commands:
//!   builder     Manage builds
//!   buildx*     Docker Buildx
//!
//! Options:
//!   -d, --detach             Run container in background
//!   -e, --env list           Set environment variables
//!       --name string        Assign a name to the container
//! ```
//!
//! Command entries keep their first token with any trailing `*` (docker's
//! plugin marker) removed. A word after the long form marks a flag that
//! takes a value.

use std::collections::HashSet;
use std::sync::LazyLock;

use command_alias_core::FlagDescriptor;
use regex::Regex;
use tracing::debug;

static PATTERNS: LazyLock<HelpPatterns> = LazyLock::new(HelpPatterns::new);

struct HelpPatterns {
    heading: Regex,
    command_entry: Regex,
    flag_entry: Regex,
}

impl HelpPatterns {
    fn new() -> Self {
        // Compile-time constant patterns; a failure is a programmer error.
        Self {
            // "Commands:", "Global Options:", "Basic Commands (Beginner):"
            heading: Regex::new(r"^([A-Za-z][A-Za-z ()-]*?)\s*:\s*$")
                .expect("static regex must compile"),
            // "  buildx*     Docker Buildx"
            command_entry: Regex::new(r"^\s+([A-Za-z0-9][A-Za-z0-9_.-]*)\*?(?:\s{2,}|\t|\s*$)")
                .expect("static regex must compile"),
            // "  -e, --env list    Set ...", "      --rm    Remove ..."
            flag_entry: Regex::new(
                r"^\s+(?:-([A-Za-z0-9]),\s+)?--([A-Za-z0-9][A-Za-z0-9_-]*)(?:[ =]([A-Za-z<\[][^\s]*))?(?:\s{2,}|\t|\s*$)",
            )
            .expect("static regex must compile"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Commands,
    Flags,
    GlobalFlags,
    Other,
}

fn classify(heading: &str) -> Section {
    // "Basic Commands (Beginner)" classifies as "Basic Commands".
    let lower = heading
        .split('(')
        .next()
        .unwrap_or(heading)
        .trim()
        .to_ascii_lowercase();
    if lower.ends_with("commands") {
        Section::Commands
    } else if lower.ends_with("options") || lower.ends_with("flags") {
        if lower.starts_with("global") {
            Section::GlobalFlags
        } else {
            Section::Flags
        }
    } else {
        Section::Other
    }
}

/// Commands and flags found in one help page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHelp {
    /// Subcommand names in listing order, deduplicated.
    pub commands: Vec<String>,
    /// Flags of this command.
    pub flags: Vec<FlagDescriptor>,
    /// Flags listed under a "Global" heading, inherited by every command.
    pub global_flags: Vec<FlagDescriptor>,
}

/// Parses one help page.
///
/// # Examples
///
/// ```
/// use command_alias_discovery::parse_help;
///
/// let help = "\
/// Usage:  docker [OPTIONS] COMMAND
///
/// Commands:
///   run         Create and run a new container
///   buildx*     Docker Buildx
///
/// Options:
///   -d, --detach      Run in background
///       --name string   Assign a name
/// ";
///
/// let parsed = parse_help(help);
/// assert_eq!(parsed.commands, vec!["run", "buildx"]);
/// assert_eq!(parsed.flags[0].short, Some('d'));
/// assert!(parsed.flags[1].takes_argument);
/// ```
pub fn parse_help(text: &str) -> ParsedHelp {
    let patterns = &*PATTERNS;
    let mut parsed = ParsedHelp::default();
    let mut seen_commands = HashSet::new();
    let mut seen_flags = HashSet::new();
    let mut section = Section::Other;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            section = Section::Other;
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            section = patterns
                .heading
                .captures(line)
                .map_or(Section::Other, |caps| classify(&caps[1]));
            continue;
        }

        match section {
            Section::Commands => {
                let Some(caps) = patterns.command_entry.captures(line) else {
                    continue;
                };
                let name = caps[1].to_string();
                if name == "help" || !seen_commands.insert(name.clone()) {
                    continue;
                }
                parsed.commands.push(name);
            }
            Section::Flags | Section::GlobalFlags => {
                let Some(flag) = parse_flag_line(line, &mut seen_flags) else {
                    continue;
                };
                if section == Section::GlobalFlags {
                    parsed.global_flags.push(flag);
                } else {
                    parsed.flags.push(flag);
                }
            }
            Section::Other => {}
        }
    }

    debug!(
        commands = parsed.commands.len(),
        flags = parsed.flags.len(),
        global_flags = parsed.global_flags.len(),
        "Parsed help text"
    );
    parsed
}

fn parse_flag_line(line: &str, seen: &mut HashSet<String>) -> Option<FlagDescriptor> {
    let caps = PATTERNS.flag_entry.captures(line)?;
    let long = &caps[2];
    if long == "help" || !seen.insert(format!("--{long}")) {
        return None;
    }
    // A short form already claimed by another flag is dropped, the flag kept.
    let short = caps
        .get(1)
        .and_then(|m| m.as_str().chars().next())
        .filter(|c| seen.insert(format!("-{c}")));

    let flag = if caps.get(3).is_some() {
        FlagDescriptor::with_value(short, long)
    } else {
        FlagDescriptor::boolean(short, long)
    };
    flag.ok()
}
