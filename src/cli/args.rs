//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Hierarchical note store: inspect outlines through the node store
#[derive(Parser, Debug)]
#[command(name = "notetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the outline as a tree
    Tree {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
    },

    /// Report integrity issues (dangling aliases, stale bookmarks, ...)
    Check {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
    },

    /// List distinct tags
    Tags {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
    },

    /// Count node types and embedded objects
    Summary {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
    },

    /// Look up a node by id or name
    Find {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
        /// Node id
        #[arg(long, conflicts_with = "name", required_unless_present = "name")]
        id: Option<i64>,
        /// Node name (first match)
        #[arg(long)]
        name: Option<String>,
    },

    /// List bookmarks in bookmark order
    Bookmarks {
        /// Outline file
        #[arg(value_hint = ValueHint::FilePath)]
        outline: PathBuf,
    },

    /// Print the effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
