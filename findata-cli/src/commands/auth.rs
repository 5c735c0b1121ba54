//! Auth commands: login, logout, register, whoami.

use anyhow::Result;
use clap::Args;
use findata_api::Registration;
use findata_core::SuccessMessage;
use serde_json::json;
use tracing::warn;

use super::{connect, print_json, text};
use crate::output::SessionOutput;
use crate::{Cli, OutputFormat};

/// Environment variable read when `--password` is omitted.
pub const PASSWORD_ENV: &str = "FINDATA_PASSWORD";

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Login name.
    pub username: String,

    /// Password. Falls back to `FINDATA_PASSWORD`.
    #[arg(long, short)]
    pub password: Option<String>,
}

/// Arguments for the register command.
#[derive(Args)]
pub struct RegisterArgs {
    /// Login name.
    pub username: String,

    /// Email address.
    #[arg(long, short)]
    pub email: String,

    /// Password.
    #[arg(long, short)]
    pub password: String,

    /// Repeated password. Defaults to the password.
    #[arg(long)]
    pub confirm: Option<String>,
}

/// Runs the login command.
pub async fn login(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let password = args
        .password
        .clone()
        .or_else(|| std::env::var(PASSWORD_ENV).ok())
        .unwrap_or_default();

    let client = connect(cli).await?;
    let user = client.auth().login(&args.username, &password).await?;

    match cli.format {
        OutputFormat::Text => {
            let message = client.config().messages.success(SuccessMessage::Login);
            println!("{message}");
            println!("{}", text(cli).format_session(&client.auth().current_session()));
        }
        OutputFormat::Json => print_json(&json!({"success": true, "user": user}), cli)?,
    }
    Ok(())
}

/// Runs the logout command.
///
/// The local session is gone even when the server call fails. An expired
/// token is not an error here.
pub async fn logout(cli: &Cli) -> Result<()> {
    let client = connect(cli).await?;
    let result = client.auth().logout().await;

    if let Err(e) = &result {
        warn!(error = %e, "Server-side logout failed");
    }
    let result = match result {
        Err(e) if e.is_auth() => Ok(()),
        other => other,
    };

    match cli.format {
        OutputFormat::Text => {
            let message = client.config().messages.success(SuccessMessage::Logout);
            println!("{message}");
        }
        OutputFormat::Json => print_json(&json!({"success": result.is_ok()}), cli)?,
    }
    Ok(result?)
}

/// Runs the register command.
pub async fn register(args: &RegisterArgs, cli: &Cli) -> Result<()> {
    let mut form = Registration::new(&args.username, &args.email, &args.password);
    if let Some(confirm) = &args.confirm {
        form = form.with_confirmation(confirm);
    }

    let client = connect(cli).await?;
    let ack = client.auth().register(&form).await?;

    match cli.format {
        OutputFormat::Text => {
            let fallback = client.config().messages.success(SuccessMessage::Register);
            println!("{}", ack.message.as_deref().unwrap_or(fallback));
        }
        OutputFormat::Json => print_json(&ack, cli)?,
    }
    Ok(())
}

/// Runs the whoami command.
pub async fn whoami(cli: &Cli) -> Result<()> {
    let client = connect(cli).await?;
    let session = client.auth().current_session();

    match cli.format {
        OutputFormat::Text => println!("{}", text(cli).format_session(&session)),
        OutputFormat::Json => print_json(&SessionOutput::from(&session), cli)?,
    }
    Ok(())
}
