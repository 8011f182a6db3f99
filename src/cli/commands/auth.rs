use clap::Subcommand;
use serde_json::json;

use crate::api::profile::unverified_claims;
use crate::auth::{FlowCommand, Stage};
use crate::cli::utils::{output_error, output_notice, output_success, output_value, prompt};
use crate::cli::OutputFormat;
use crate::console::Console;

use super::signed_in;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email or employee id, then a one-time password")]
    Login {
        #[arg(help = "Email address or employee id")]
        identifier: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "One-time password (will prompt if not provided)")]
        otp: Option<String>,
    },

    #[command(about = "Sign out and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login {
            identifier,
            password,
            otp,
        } => login(console, identifier, password, otp, output_format).await,
        AuthCommands::Logout => {
            console.sign_out()?;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => {
            let authenticated = console.session().is_authenticated();
            let message = if authenticated { "Signed in" } else { "Not signed in" };
            output_success(
                &output_format,
                message,
                Some(json!({
                    "authenticated": authenticated,
                    "api_url": console.api().base_url().as_str(),
                })),
            )?;
            if !authenticated && output_format == OutputFormat::Text {
                println!("Run `orgctl auth login <email or employee id>` to sign in");
            }
            Ok(())
        }
        AuthCommands::Whoami => whoami(console, output_format).await,
    }
}

async fn login(
    console: &Console,
    identifier: String,
    password: Option<String>,
    otp: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if console.enter(console.guard().login_path()).is_err() {
        return output_success(&output_format, "Already signed in", None);
    }

    let flow = console.auth_flow();
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    if let FlowCommand::Show(notice) = flow.submit_credentials(&identifier, &password).await? {
        if notice.is_error() {
            anyhow::bail!("{}", notice.text());
        }
        output_notice(&output_format, &notice)?;
    }
    if flow.stage() != Stage::OtpPending {
        anyhow::bail!("Login did not reach the OTP step");
    }

    // A one-shot --otp is not retried; the prompt loops until success or EOF.
    let interactive = otp.is_none();
    let mut otp = otp;

    loop {
        let code = match otp.take() {
            Some(code) => code,
            None => {
                let email = flow.otp_email().unwrap_or_default();
                prompt(&format!("OTP sent to {} (enter 'r' to resend): ", email))?
            }
        };

        if code.trim().eq_ignore_ascii_case("r") {
            if let FlowCommand::Show(notice) = flow.resend().await? {
                output_notice(&output_format, &notice)?;
            }
            continue;
        }

        match flow.submit_otp(&code).await {
            Ok(FlowCommand::NavigateTo(path)) => {
                tracing::debug!(%path, "login complete");
                return output_success(&output_format, "Signed in", Some(json!({ "landing": path })));
            }
            Ok(FlowCommand::Show(notice)) if interactive => output_notice(&output_format, &notice)?,
            Ok(FlowCommand::Show(notice)) => anyhow::bail!("{}", notice.text()),
            Err(crate::auth::FlowError::Invalid(errors)) if interactive => {
                output_error(&output_format, &errors.to_string(), None)?
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn whoami(console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    let token = signed_in(console, console.guard().landing_path())?;

    match console.api().fetch_profile(&token).await {
        Ok(profile) => output_value(&output_format, profile.display_name(), &profile),
        Err(failure) => {
            tracing::warn!(%failure, "profile lookup failed, reading token claims");
            match unverified_claims(&token) {
                Some(profile) => output_value(&output_format, profile.display_name(), &profile),
                None => Err(anyhow::anyhow!(failure.user_message("Failed to load profile"))),
            }
        }
    }
}
