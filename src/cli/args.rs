//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// Generate, expand and inspect dependency query trees
#[derive(Parser, Debug)]
#[command(name = "querytree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .querytree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// How trees are printed
    #[arg(long, value_enum, global = true, env = "QUERYTREE_FORMAT", default_value = "tree")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented tree drawing
    #[default]
    Tree,
    /// One line per tree in bracket notation
    Compact,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enumerate all tree shapes of a size ("k") or size range ("lo-hi")
    Generate {
        range: String,
    },

    /// Grow seed queries for n generations
    Expand {
        /// Number of generations
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        generations: i64,

        /// Seed queries (default: a single unrestricted node)
        queries: Vec<String>,
    },

    /// Split query text on spaces outside parentheses
    Tokenize {
        /// Query text
        #[arg(conflicts_with = "stdin")]
        text: Option<String>,

        /// Read raw query text from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Decode a query into its tree
    Decode {
        query: String,
    },

    /// Print tree sizes and their range
    Size {
        #[arg(required = true)]
        queries: Vec<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config file locations
    Path,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },
}
