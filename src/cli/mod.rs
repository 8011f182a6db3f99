pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::console::{Console, MutationError};
use crate::error::ApiFailure;
use crate::models::{Department, Designation, Organization, Role};

#[derive(Parser)]
#[command(name = "orgctl")]
#[command(about = "Administrative console for organisations, departments, roles, designations, clients and users")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, conflicts_with = "json", help = "Output in YAML format")]
    pub yaml: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and inspect the session")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Manage organisations")]
    Org {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Manage departments")]
    Dept {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Manage roles")]
    Role {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Manage designations")]
    Designation {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Manage clients")]
    Client {
        #[command(subcommand)]
        cmd: commands::client::ClientCommands,
    },

    #[command(about = "Manage admin users")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

impl Commands {
    /// Console route an entity command stands for; the route guard runs on
    /// it. Auth commands use the configured login and landing paths instead.
    pub fn route(&self) -> Option<&'static str> {
        match self {
            Commands::Auth { .. } => None,
            Commands::Org { .. } => Some("/authenticated/organization"),
            Commands::Dept { .. } => Some("/authenticated/department"),
            Commands::Role { .. } => Some("/authenticated/role"),
            Commands::Designation { .. } => Some("/authenticated/designation"),
            Commands::Client { .. } => Some("/authenticated/client"),
            Commands::User { .. } => Some("/authenticated/user-list"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else if cli.yaml {
            OutputFormat::Yaml
        } else {
            OutputFormat::Text
        }
    }

    pub fn is_structured(&self) -> bool {
        !matches!(self, OutputFormat::Text)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let console = Console::from_config(config::config())?;

    let result = dispatch(cli.command, &console, output_format).await;

    if let Err(e) = &result {
        if output_format.is_structured() {
            report_structured_error(&output_format, e)?;
        }
    }
    result
}

fn report_structured_error(output_format: &OutputFormat, error: &anyhow::Error) -> anyhow::Result<()> {
    if let Some(MutationError::Invalid(errors)) = error.downcast_ref::<MutationError>() {
        return utils::output_field_errors(output_format, errors);
    }

    let code = error
        .downcast_ref::<MutationError>()
        .and_then(MutationError::failure)
        .or_else(|| error.downcast_ref::<ApiFailure>())
        .map(ApiFailure::error_code);
    utils::output_error(output_format, &error.to_string(), code)
}

async fn dispatch(command: Commands, console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    let route = command.route().unwrap_or_default();

    match command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, console, output_format).await,
        Commands::Org { cmd } => {
            commands::entity::handle::<Organization>(cmd, console, route, output_format).await
        }
        Commands::Dept { cmd } => {
            commands::entity::handle::<Department>(cmd, console, route, output_format).await
        }
        Commands::Role { cmd } => commands::entity::handle::<Role>(cmd, console, route, output_format).await,
        Commands::Designation { cmd } => {
            commands::entity::handle::<Designation>(cmd, console, route, output_format).await
        }
        Commands::Client { cmd } => commands::client::handle(cmd, console, route, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, console, route, output_format).await,
    }
}
