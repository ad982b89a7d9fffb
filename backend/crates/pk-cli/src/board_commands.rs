use clap::Subcommand;

#[derive(Subcommand)]
pub enum BoardCommands {
    /// List the board configurations available to the user
    Configs,
    /// Load a board and print its lanes
    Show {
        /// Saved view ID
        #[arg(long)]
        view: Option<String>,
        /// Card form ID
        #[arg(long)]
        form: Option<String>,
        /// Saved view ID for the secondary entity
        #[arg(long)]
        secondary_view: Option<String>,
        /// Card form ID for the secondary entity
        #[arg(long)]
        secondary_form: Option<String>,
        /// Only show lanes of this state (repeatable)
        #[arg(long = "state")]
        states: Vec<i32>,
        /// Case-insensitive text filter over card values
        #[arg(long)]
        search: Option<String>,
        /// Show secondary records as swimlanes under their parents
        #[arg(long)]
        secondary: bool,
    },
    /// Make a board configuration the user's default
    SetDefault {
        /// Board configuration (web resource) ID
        id: String,
    },
}
