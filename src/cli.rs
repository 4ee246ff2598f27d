//! CLI command definitions and subcommands

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use rfp_forge_core::Answer;
use rfp_forge_llm::ProviderType;

use crate::models::settings::SettingsUpdate;

/// RFP Forge - guided interview that turns a service idea into an RFP
#[derive(Debug, Parser)]
#[command(name = "rfp-forge", version, about = "Guided service-planning interview and RFP generator")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a project
    New { name: String },

    /// List projects, newest first
    List,

    /// Show a project with its progress
    Show { project_id: String },

    /// Rename a project
    Rename { project_id: String, name: String },

    /// Delete a project and everything recorded for it
    Delete { project_id: String },

    /// Print the question for the current step
    Question { project_id: String },

    /// Answer the current step
    Answer {
        project_id: String,

        /// Step being answered (must be the current step)
        #[arg(short, long)]
        step: u32,

        /// Free-text answer
        text: Option<String>,

        /// Selected option (repeat for multiple choices)
        #[arg(long = "choice", conflicts_with = "text")]
        choices: Vec<String>,

        /// Free-form text added to a choice answer
        #[arg(long)]
        supplement: Option<String>,
    },

    /// Decide a pending phase checkpoint
    Transition {
        project_id: String,

        /// Continue into the next phase
        #[arg(long, conflicts_with = "stop")]
        proceed: bool,

        /// Skip ahead to the wrap-up phase
        #[arg(long)]
        stop: bool,
    },

    /// Show the recorded answers
    Answers { project_id: String },

    /// Preview sections and completion figures
    Preview { project_id: String },

    /// Generate and store an RFP document
    Generate { project_id: String },

    /// Print the newest RFP document as Markdown
    Export { project_id: String },

    /// Check database and provider status
    Health,

    /// Show or change config.json
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the current configuration
    Show,

    /// Change one or more settings
    Set {
        /// Turn text generation on or off
        #[arg(long)]
        llm_enabled: Option<bool>,

        #[arg(long, value_enum)]
        provider: Option<ProviderArg>,

        #[arg(long)]
        model: Option<String>,

        /// Environment variable holding the API key
        #[arg(long)]
        api_key_env: Option<String>,

        #[arg(long)]
        timeout_secs: Option<u64>,

        #[arg(long)]
        database_path: Option<String>,

        #[arg(long)]
        log_level: Option<String>,
    },

    /// Restore defaults
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Anthropic,
    Openai,
}

impl From<ProviderArg> for ProviderType {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Anthropic => ProviderType::Anthropic,
            ProviderArg::Openai => ProviderType::OpenAI,
        }
    }
}

/// Build the answer from the positional text or the `--choice` flags
pub fn answer_from_args(text: Option<String>, choices: Vec<String>) -> Answer {
    match text {
        Some(text) => Answer::Text(text),
        None => Answer::Choices(choices),
    }
}

impl ConfigCommand {
    /// The partial update described by a `config set` invocation
    pub fn to_update(&self) -> Option<SettingsUpdate> {
        match self {
            Self::Set {
                llm_enabled,
                provider,
                model,
                api_key_env,
                timeout_secs,
                database_path,
                log_level,
            } => Some(SettingsUpdate {
                llm_enabled: *llm_enabled,
                provider: provider.map(ProviderType::from),
                model: model.clone(),
                api_key_env: api_key_env.clone(),
                timeout_secs: *timeout_secs,
                database_path: database_path.clone(),
                log_level: log_level.clone(),
            }),
            _ => None,
        }
    }
}
