//! CLI argument definitions for the `calltree` tool.
//!
//! Configuration-layer flags (`--backend`, `--tag-path`, ...) are partitioned
//! out before these arguments are parsed; see [`crate::CONFIG_CLI_FLAGS`].

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Output format for the rendered forest.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Box-drawing text tree.
    #[default]
    Text,
    /// Self-contained HTML page with collapsible lists.
    Html,
    /// JSON document describing every tree.
    Json,
}

/// Command-line interface for the `calltree` tool.
#[derive(Parser, Debug)]
#[command(
    name = "calltree",
    version,
    about = "Builds caller trees from GNU Global or cscope indexes"
)]
pub(crate) struct Cli {
    /// Comma-separated root symbols.
    #[arg(value_name = "SYMBOLS", required = true, value_delimiter = ',')]
    pub(crate) symbols: Vec<String>,
    /// Comma-separated caller names to leave out of every tree.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub(crate) blacklist: Vec<String>,
    /// Treats blacklist entries as regular expressions.
    #[arg(long)]
    pub(crate) regex: bool,
    /// Maximum tree depth in edges; `-1` means unlimited.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub(crate) max_depth: Option<i64>,
    /// Prints the call site next to every caller.
    #[arg(long)]
    pub(crate) show_position: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Writes output to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Shows blacklisted callers as marked leaves instead of omitting them.
    #[arg(long)]
    pub(crate) mark_blacklisted: bool,
    /// Stops at symbols already expanded elsewhere in the output.
    #[arg(long)]
    pub(crate) collapse_repeats: bool,
    /// Raises log verbosity to `debug`.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}
