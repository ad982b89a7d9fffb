use clap::Subcommand;

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Move a card to another lane
    Move {
        /// Record ID
        id: String,
        /// Option value of the target lane
        #[arg(long)]
        to: i32,
    },
    /// List the lanes a card may be moved to
    Targets {
        /// Record ID
        id: String,
    },
    /// Quick-create a primary record
    Create,
    /// Print the address of a record's form
    Open {
        /// Record ID
        id: String,
    },
    /// Watch a record for changes
    Subscribe {
        /// Record ID
        id: String,
    },
    /// Stop watching a record
    Unsubscribe {
        /// Record ID
        id: String,
    },
}
