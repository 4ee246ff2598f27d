//! RFP Forge - CLI entry point
//!
//! Every subcommand maps onto one command handler; results are printed as
//! pretty JSON on stdout and logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rfp_forge::cli::{answer_from_args, Cli, Command, ConfigCommand};
use rfp_forge::commands::{self, SubmitAnswerRequest};
use rfp_forge::storage::ConfigService;
use rfp_forge::{AppState, CommandResponse};

fn setup_logging(default_level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Print a response, turning a failed one into a non-zero exit
fn emit<T: Serialize>(response: CommandResponse<T>) -> Result<()> {
    if !response.success {
        bail!(response.error.unwrap_or_else(|| "unknown error".to_string()));
    }
    println!("{}", serde_json::to_string_pretty(&response.data)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::at(path),
        None => ConfigService::new(),
    }
    .context("Failed to load configuration")?;

    setup_logging(&config_service.get_config().log_level, cli.verbose);
    debug!(path = %config_service.path().display(), "configuration loaded");

    let state = AppState::from_config(config_service).context("Failed to initialize state")?;

    match cli.command {
        Command::New { name } => emit(commands::create_project(&state, name).await),
        Command::List => emit(commands::list_projects(&state).await),
        Command::Show { project_id } => emit(commands::get_progress(&state, project_id).await),
        Command::Rename { project_id, name } => {
            emit(commands::rename_project(&state, project_id, name).await)
        }
        Command::Delete { project_id } => emit(commands::delete_project(&state, project_id).await),
        Command::Question { project_id } => {
            emit(commands::get_next_question(&state, project_id).await)
        }
        Command::Answer {
            project_id,
            step,
            text,
            choices,
            supplement,
        } => {
            let request = SubmitAnswerRequest {
                project_id,
                step_number: step,
                answer: answer_from_args(text, choices),
                custom_input: supplement,
            };
            emit(commands::submit_answer(&state, request).await)
        }
        Command::Transition {
            project_id,
            proceed,
            stop,
        } => {
            if !proceed && !stop {
                bail!("Pass --proceed or --stop");
            }
            emit(commands::resolve_phase_transition(&state, project_id, proceed).await)
        }
        Command::Answers { project_id } => emit(commands::get_answers(&state, project_id).await),
        Command::Preview { project_id } => emit(commands::get_rfp_preview(&state, project_id).await),
        Command::Generate { project_id } => emit(commands::generate_rfp(&state, project_id).await),
        Command::Export { project_id } => {
            let response = commands::export_rfp_markdown(&state, project_id).await;
            match (response.success, response.data) {
                (true, Some(markdown)) => {
                    print!("{}", markdown);
                    Ok(())
                }
                _ => bail!(response.error.unwrap_or_else(|| "export failed".to_string())),
            }
        }
        Command::Health => emit(commands::get_health(&state).await),
        Command::Config { command } => match command {
            ConfigCommand::Show => emit(commands::get_settings(&state).await),
            ConfigCommand::Reset => emit(commands::reset_settings(&state).await),
            set => match set.to_update() {
                Some(update) => emit(commands::update_settings(&state, update).await),
                None => bail!("Nothing to update"),
            },
        },
    }
}
