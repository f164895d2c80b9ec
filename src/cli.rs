use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::paths::{DEFAULT_MANIFEST, DEFAULT_STATE_FILE, ENV_MANIFEST, ENV_STATE_FILE};

#[derive(Parser)]
#[command(name = "mockapi-provider")]
#[command(version)]
#[command(about = "Declarative provisioning for Mock API Studio", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Manifest declaring the desired resources
    #[arg(short = 'f', long, global = true, env = ENV_MANIFEST, default_value = DEFAULT_MANIFEST)]
    pub manifest: String,

    /// File recording tracked instances
    #[arg(long, global = true, env = ENV_STATE_FILE, default_value = DEFAULT_STATE_FILE)]
    pub state: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan(PlanArgs),

    /// Make the remote service match the manifest
    Apply(ApplyArgs),

    /// Destroy every tracked instance
    Destroy(DestroyArgs),

    /// Read tracked instances back and record drift
    Refresh,

    /// Show tracked state
    Show {
        /// Address to show, e.g. mock_api_studio_workspace.team_a
        address: Option<String>,
    },

    /// Print provider, resource and data source schemas as JSON
    Schema,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Plan / Apply / Destroy
// ============================================================================

#[derive(Parser)]
pub struct PlanArgs {
    /// Limit to a kind or a single address (e.g. mock_api_studio_api.orders)
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Limit to a kind or a single address, plus its dependencies
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub auto_approve: bool,

    /// Dry run - show the plan without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct DestroyArgs {
    /// Limit to a kind or a single address, plus its dependents
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub auto_approve: bool,
}
