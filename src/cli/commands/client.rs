use clap::Subcommand;

use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::console::{load_client_form_options, Console};
use crate::models::Client;

use super::entity::{self, EntityCommands};
use super::signed_in;

#[derive(Subcommand)]
pub enum ClientCommands {
    #[command(flatten)]
    Record(EntityCommands),

    #[command(about = "Show departments and project managers a client can be assigned")]
    Options,
}

pub async fn handle(
    cmd: ClientCommands,
    console: &Console,
    route: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ClientCommands::Record(cmd) => entity::handle::<Client>(cmd, console, route, output_format).await,
        ClientCommands::Options => {
            let token = signed_in(console, route)?;
            let options = load_client_form_options(console.api(), &token).await;
            output_value(&output_format, "Client form options", &options)?;
            if options.departments.is_none() || options.project_managers.is_none() {
                tracing::warn!("some client form options could not be loaded");
            }
            Ok(())
        }
    }
}
