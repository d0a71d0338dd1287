//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Per-user skill trees: add, train and prune skills laid out on a canvas
#[derive(Parser, Debug)]
#[command(name = "skilltree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .skilltree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Owner whose tree to operate on (default: config default_owner)
    #[arg(short, long, global = true, env = "SKILLTREE_OWNER")]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register an external user and provision their root skill
    InitUser {
        /// External identity (e.g. messenger user id)
        #[arg(allow_negative_numbers = true)]
        external_id: i64,
        /// Display name to store for the user
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Provision the owner's root skill if missing
    EnsureRoot,

    /// Add a skill below a parent
    Add {
        /// Skill id, unique within the owner's tree
        id: String,
        /// Display name
        name: String,
        /// Parent skill id (omitted or unknown: skill becomes a root)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Delete a skill and everything below it
    Delete {
        /// Skill id
        id: String,
    },

    /// Train a skill (+10 levels, max 100)
    Train {
        /// Skill id
        id: String,
    },

    /// Show a single skill
    Show {
        /// Skill id
        id: String,
    },

    /// List skills
    List {
        /// Print the listing as JSON keyed by skill id
        #[arg(long)]
        json: bool,
        /// List every owner, not just one
        #[arg(short, long)]
        all: bool,
    },

    /// Show the owner's skills as a tree
    Tree,

    /// List registered users
    Owners,

    /// Show store and tree status
    Info,

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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
