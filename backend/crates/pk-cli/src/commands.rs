use crate::{
    board_commands::BoardCommands, notification_commands::NotificationCommands,
    record_commands::RecordCommands,
};

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Board configurations and lanes
    Board {
        #[command(subcommand)]
        action: BoardCommands,
    },

    /// Card operations
    Record {
        #[command(subcommand)]
        action: RecordCommands,
    },

    /// Change notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationCommands,
    },
}
