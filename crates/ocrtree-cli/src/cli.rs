use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Annotate, convert and inspect OCR box trees.
#[derive(Debug, Parser)]
#[command(name = "ocrtree", about, version)]
pub struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Label the words of every line with the features found on it
    Annotate {
        /// Path to the tree (.json or .csv)
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Feature configuration file (JSON)
        #[arg(long, value_name = "FILE")]
        features: Option<PathBuf>,

        /// Add the built-in features. Implied when no --features file is given
        #[arg(long)]
        builtin: bool,

        /// Output format. Default: from the output extension, JSON on stdout
        #[arg(long, value_enum)]
        format: Option<TreeFormat>,

        /// Write the annotated tree here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert a tree between the JSON and CSV formats
    Convert {
        /// Input tree (.json or .csv)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output tree (.json or .csv)
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Print confidence statistics over the leaves of a tree
    Confidence {
        /// Path to the tree (.json or .csv)
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the text of every line of a tree
    Text {
        /// Path to the tree (.json or .csv)
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// File format of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    /// Nested JSON records
    Json,
    /// One CSV row per box
    Csv,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}
