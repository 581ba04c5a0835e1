//! Parses captured help text and prints the commands and flags found.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-alias-discovery --example parse_help
//! ```

use command_alias_discovery::parse_help;

fn main() {
    let help_text = r#"
Usage:  mycli [OPTIONS] COMMAND

A fictional CLI tool for demonstration

Commands:
  init        Initialize a new project
  build       Build the project
  deploy*     Deploy to production (plugin)
  help        Help about any command

Options:
  -v, --verbose          Enable verbose output
  -q, --quiet            Suppress all output
  -c, --config string    Path to config file
      --no-color         Disable colored output
  -j, --jobs int         Number of parallel jobs
  -h, --help             Print help
"#;

    let parsed = parse_help(help_text);

    println!("Commands ({}):", parsed.commands.len());
    for command in &parsed.commands {
        println!("  {command}");
    }

    println!("\nFlags ({}):", parsed.flags.len());
    for flag in &parsed.flags {
        let short = flag.short_flag().map(|s| format!("{s}, ")).unwrap_or_default();
        let value = if flag.takes_argument { " <value>" } else { "" };
        println!("  {short}{}{value}", flag.long_flag());
    }
}
