//! pk - process kanban board for Dynamics 365
//!
//! Loads a board configuration, prints its lanes as JSON and applies card moves.
//!
//! # Examples
//!
//! ```bash
//! # Print the default board
//! pk board show --pretty
//!
//! # Only active cases mentioning "printer"
//! pk board show --state 0 --search printer
//!
//! # Move a case to "On Hold"
//! pk record move 3f2a... --to 2
//! ```

mod board_commands;
mod cli;
mod commands;
mod notification_commands;
mod record_commands;

use crate::{
    board_commands::BoardCommands, cli::Cli, commands::Commands,
    notification_commands::NotificationCommands, record_commands::RecordCommands,
};

use pk_board::DataClient;
use pk_cli::{BoardApp, CliErrorResult, ShowOptions, WebApiClient, logger, produce_notifications};
use pk_config::Config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::error;
use serde_json::Value;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::initialize(
        config.logging.level,
        config.logging.file.as_ref().map(PathBuf::from),
        config.logging.colored,
    ) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    config.log_summary();

    // Handle result
    match run(cli.command, &config, cli.config_id, cli.hide_empty_lanes).await {
        Ok(value) => {
            let output = if cli.pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            };

            match output {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error serializing response: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> CliErrorResult<Config> {
    let config = Config::load()?;
    config.validate()?;
    Ok(config)
}

async fn run(
    command: Commands,
    config: &Config,
    config_id: Option<String>,
    hide_empty_lanes: bool,
) -> CliErrorResult<Value> {
    let client: Arc<dyn DataClient> = Arc::new(WebApiClient::new(&config.api)?);
    let app = BoardApp::new(client, config, config_id, hide_empty_lanes);

    match command {
        // Board commands
        Commands::Board { action } => match action {
            BoardCommands::Configs => app.list_configurations().await,
            BoardCommands::Show {
                view,
                form,
                secondary_view,
                secondary_form,
                states,
                search,
                secondary,
            } => {
                app.show(&ShowOptions {
                    view,
                    form,
                    secondary_view,
                    secondary_form,
                    states,
                    search,
                    secondary,
                })
                .await
            }
            BoardCommands::SetDefault { id } => app.set_default_board(&id).await,
        },

        // Record commands
        Commands::Record { action } => match action {
            RecordCommands::Move { id, to } => app.move_record(&id, to).await,
            RecordCommands::Targets { id } => app.drop_targets(&id).await,
            RecordCommands::Create => app.create_record().await,
            RecordCommands::Open { id } => app.open_record(&id).await,
            RecordCommands::Subscribe { id } => app.subscribe(&id).await,
            RecordCommands::Unsubscribe { id } => app.unsubscribe(&id).await,
        },

        // Notification commands
        Commands::Notifications { action } => match action {
            NotificationCommands::Show { id, mark_read } => {
                app.notification_details(&id, mark_read).await
            }
            NotificationCommands::Clear { id } => app.clear_notifications(&id).await,
            NotificationCommands::Produce { event, settings } => {
                produce_notifications(app.client(), &event, &settings).await
            }
        },
    }
}
