use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "pk")]
#[command(about = "Process kanban board for Dynamics 365")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Board configuration to open (defaults to the user's default board)
    #[arg(long, global = true)]
    pub(crate) config_id: Option<String>,

    /// Hide lanes without cards
    #[arg(long, global = true)]
    pub(crate) hide_empty_lanes: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub(crate) pretty: bool,
}
