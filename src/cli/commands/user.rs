use clap::Subcommand;
use serde::Serialize;

use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::console::{load_user_form_options, Console, UserFormOptions};
use crate::models::AdminUser;
use crate::repository::Resource;

use super::entity::{self, EntityCommands};
use super::signed_in;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(flatten)]
    Record(EntityCommands),

    #[command(about = "Show roles, organisations, departments, designations and team members for the user form")]
    Options,
}

/// Option lists trimmed to what the text view prints.
#[derive(Serialize)]
struct OptionCounts {
    roles: Option<usize>,
    organisations: Option<usize>,
    departments: Option<usize>,
    designations: Option<usize>,
    team_members: Option<usize>,
}

impl From<&UserFormOptions> for OptionCounts {
    fn from(options: &UserFormOptions) -> Self {
        Self {
            roles: options.roles.as_ref().map(Vec::len),
            organisations: options.organisations.as_ref().map(Vec::len),
            departments: options.departments.as_ref().map(Vec::len),
            designations: options.designations.as_ref().map(Vec::len),
            team_members: options.team_members.as_ref().map(Vec::len),
        }
    }
}

pub async fn handle(
    cmd: UserCommands,
    console: &Console,
    route: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Record(cmd) => entity::handle::<AdminUser>(cmd, console, route, output_format).await,
        UserCommands::Options => {
            let token = signed_in(console, route)?;
            let options = load_user_form_options(console.api(), &token).await;

            match output_format {
                OutputFormat::Text => {
                    output_value(&output_format, "User form options", &OptionCounts::from(&options))?;
                    if !options.is_complete() {
                        eprintln!("Warning: some {} options could not be loaded", AdminUser::SINGULAR);
                    }
                }
                _ => output_value(&output_format, "User form options", &options)?,
            }
            Ok(())
        }
    }
}
