use clap::Subcommand;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::cli::utils::{confirm, output_records, output_success, output_value, parse_filters, read_payload};
use crate::cli::OutputFormat;
use crate::console::{Confirmation, Console, Mutation};
use crate::repository::Resource;
use crate::types::Action;

use super::signed_in;

#[derive(Subcommand)]
pub enum EntityCommands {
    #[command(about = "List records")]
    List {
        #[arg(long = "filter", value_name = "KEY=VALUE", help = "Restrict the list (e.g. organisationId=42)")]
        filters: Vec<String>,
    },

    #[command(about = "Show one record")]
    Get {
        #[arg(help = "Record id")]
        id: String,
    },

    #[command(about = "Create a record from JSON")]
    Create {
        #[arg(long, help = "JSON payload (read from stdin if not provided)")]
        data: Option<String>,
    },

    #[command(about = "Update a record from JSON")]
    Update {
        #[arg(help = "Record id")]
        id: String,
        #[arg(long, help = "JSON payload (read from stdin if not provided)")]
        data: Option<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record id")]
        id: String,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle<R>(
    cmd: EntityCommands,
    console: &Console,
    route: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()>
where
    R: Resource,
    R::Create: DeserializeOwned,
    R::Update: DeserializeOwned,
{
    let token = signed_in(console, route)?;
    let mut list = console.list::<R>();

    match cmd {
        EntityCommands::List { filters } => {
            for (key, value) in parse_filters(&filters)? {
                if !R::LIST_FILTERS.contains(&key.as_str()) {
                    anyhow::bail!(
                        "{} cannot be filtered by '{}' (supported: {})",
                        R::PLURAL,
                        key,
                        supported_filters::<R>()
                    );
                }
                list = list.with_filter(key, value);
            }

            list.reload(&token).await.map_err(|failure| {
                let message = failure.user_message(&R::fallback_message(Action::List));
                anyhow::Error::new(failure).context(message)
            })?;
            output_records(&output_format, list.records())
        }
        EntityCommands::Get { id } => {
            let record = console
                .repository::<R>()
                .fetch_one(&token, &id)
                .await
                .map_err(|failure| {
                    let message = failure.user_message(&R::fallback_message(Action::Get));
                    anyhow::Error::new(failure).context(message)
                })?;
            output_value(&output_format, record.label(), &record)
        }
        EntityCommands::Create { data } => {
            let payload: R::Create = read_payload(data)?;
            let mutation = list.create(&token, &payload).await?;
            report(&output_format, &mutation, None)
        }
        EntityCommands::Update { id, data } => {
            let payload: R::Update = read_payload(data)?;
            let mutation = list.update(&token, &id, &payload).await?;
            report(&output_format, &mutation, Some(&id))
        }
        EntityCommands::Delete { id, yes } => {
            let confirmation = if yes || confirm(&format!("Delete {} '{}'?", R::SINGULAR, id))? {
                Confirmation::Confirmed
            } else {
                Confirmation::Declined
            };
            if confirmation == Confirmation::Declined {
                return output_success(&output_format, "Deletion cancelled", None);
            }

            let mutation = list.delete(&token, &id, confirmation).await?;
            report(&output_format, &mutation, Some(&id))
        }
    }
}

fn supported_filters<R: Resource>() -> String {
    if R::LIST_FILTERS.is_empty() {
        "none".to_string()
    } else {
        R::LIST_FILTERS.join(", ")
    }
}

fn report<R: Resource>(output_format: &OutputFormat, mutation: &Mutation<R>, id: Option<&str>) -> anyhow::Result<()> {
    let subject = mutation
        .record
        .as_ref()
        .map(|r| r.label().to_string())
        .or_else(|| id.map(str::to_string))
        .unwrap_or_default();

    let message = match &mutation.message {
        Some(message) if !message.trim().is_empty() => message.clone(),
        _ => format!("{} '{}' {}d", capitalize(R::SINGULAR), subject, mutation.action.verb()),
    };

    let record_key = R::SINGULAR;
    output_success(
        output_format,
        &message,
        Some(json!({
            record_key: mutation.record,
            "stale": mutation.stale,
        })),
    )?;

    if mutation.stale && *output_format == OutputFormat::Text {
        eprintln!("Warning: could not reload {} after the change", R::PLURAL);
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
