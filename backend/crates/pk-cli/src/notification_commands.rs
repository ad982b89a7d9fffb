use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// Show a card's notifications and the changed fields
    Show {
        /// Record ID
        id: String,
        /// Clear the notifications afterwards
        #[arg(long)]
        mark_read: bool,
    },
    /// Clear a card's notifications
    Clear {
        /// Record ID
        id: String,
    },
    /// Create notifications for a saved record event
    Produce {
        /// JSON file holding the event
        #[arg(long)]
        event: PathBuf,
        /// JSON file holding the producer settings
        #[arg(long)]
        settings: PathBuf,
    },
}
