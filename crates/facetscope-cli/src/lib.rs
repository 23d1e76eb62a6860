//! Command-line surface of facetscope.
//!
//! Lives in its own crate so `build.rs` (manpage) and `gen_docs` can build
//! the clap command without compiling the whole application.

use clap::{builder::Str, Arg, CommandFactory, Parser, ValueEnum};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Compressed input encodings decoded while streaming.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// gzip (.gz), including concatenated members
    Gzip,
    /// Zstandard (.zst, .zstd)
    Zstd,
    /// bzip2 (.bz2, .bz)
    Bzip2,
    /// xz / LZMA2 (.xz)
    Xz,
}

/// Recognised suffixes; the first one per format is canonical.
const SUFFIXES: [(&str, CompressionFormat); 6] = [
    ("gz", CompressionFormat::Gzip),
    ("zst", CompressionFormat::Zstd),
    ("zstd", CompressionFormat::Zstd),
    ("bz2", CompressionFormat::Bzip2),
    ("bz", CompressionFormat::Bzip2),
    ("xz", CompressionFormat::Xz),
];

impl CompressionFormat {
    /// Guess the format from the last extension of `path`, case-insensitively.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| *suffix == ext)
            .map(|(_, format)| *format)
    }

    pub fn extension(&self) -> &'static str {
        SUFFIXES
            .iter()
            .find(|(_, format)| format == self)
            .map(|(suffix, _)| *suffix)
            .unwrap_or_default()
    }
}

#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "facetscope",
    version,
    about = "Live faceted histograms of tab-separated streams",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// File to read records from. Reads standard input when omitted or "-"
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Facet column (1-indexed) to display; 0 for all facets
    #[arg(short = 'f', long = "facet", default_value_t = 0, value_name = "N")]
    pub facet: usize,

    /// Display mean and standard deviation instead of a full histogram
    #[arg(long = "stats")]
    pub stats: bool,

    /// Decompress the input with this codec instead of guessing from the file name
    #[arg(long = "compression", value_enum, value_name = "FORMAT")]
    pub compression: Option<CompressionFormat>,

    /// Number of lines buffered between the reader and the display (default: 100)
    #[arg(long = "queue-capacity", value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Milliseconds between drains of the input queue (default: 500)
    #[arg(long = "tick-ms", value_name = "MS")]
    pub tick_interval_ms: Option<u64>,

    /// Show event counters and queue state in a status row
    #[arg(long = "debug")]
    pub debug: bool,

    /// Write log output to this file (filter with RUST_LOG)
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Write the commented default config to ~/.config/facetscope/config.toml and exit
    #[arg(long = "generate-config")]
    pub generate_config: bool,

    /// Replace an existing config file (with --generate-config)
    #[arg(long = "force", requires = "generate_config")]
    pub force: bool,
}

impl Args {
    /// Input path, or None when records come from standard input.
    pub fn input_path(&self) -> Option<&Path> {
        self.path.as_deref().filter(|p| p.as_os_str() != "-")
    }
}

/// How an argument is spelled in the options table, e.g. `-f, --facet <N>`.
fn usage_cell(arg: &Arg) -> String {
    let values = arg
        .get_value_names()
        .unwrap_or_default()
        .iter()
        .map(|name: &Str| format!("<{}>", name.as_str()))
        .collect::<Vec<_>>()
        .join(" ");

    if arg.is_positional() {
        return if arg.is_required_set() {
            values
        } else {
            format!("[{values}]")
        };
    }

    let flags = arg
        .get_short()
        .map(|s| format!("-{s}"))
        .into_iter()
        .chain(arg.get_long().map(|l| format!("--{l}")))
        .collect::<Vec<_>>()
        .join(", ");
    if values.is_empty() || !arg.get_action().takes_values() {
        flags
    } else {
        format!("{flags} {values}")
    }
}

/// Markdown reference for every option, printed by `gen_docs`.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::new();
    let _ = writeln!(out, "# Command Line Options\n");
    let _ = writeln!(out, "## Usage\n\n```\n{}\n```\n", cmd.render_usage());
    let _ = writeln!(out, "## Options\n");
    let _ = writeln!(out, "| Option | Description |");
    let _ = writeln!(out, "|--------|-------------|");

    let documented = cmd
        .get_arguments()
        .filter(|arg| !matches!(arg.get_id().as_str(), "help" | "version"));
    for arg in documented {
        let help = arg
            .get_help()
            .map(|h| h.to_string().replace('|', "\\|").replace(['\n', '\r'], " "))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "| `{}` | {} |", usage_cell(arg), help);
    }

    out
}
