use clap::Subcommand;
use serde_json::json;

use crate::apis::{self, LoginRequest, RegisterRequest};
use crate::cli::commands::session_failed;
use crate::cli::utils::{output_record, output_success, request_failed};
use crate::cli::OutputFormat;
use crate::console::Console;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login with email or phone number")]
    Login {
        #[arg(help = "Email or phone number")]
        account: String,
        #[arg(long, env = "EBBING_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Revoke the current token and clear local credentials")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Exchange the refresh token for a new access token")]
    Refresh,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Register new user and log in")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "EBBING_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },
}

pub async fn handle(cmd: AuthCommands, console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = &console.session;
    let client = &console.client;

    match cmd {
        AuthCommands::Login { account, password } => {
            let response = session
                .login(client, &LoginRequest { account, password })
                .await
                .map_err(|e| session_failed(&output_format, e))?;
            let user = session
                .get_info(client)
                .await
                .map_err(|e| session_failed(&output_format, e))?;

            output_success(
                &output_format,
                &format!("Logged in as {}", user.email),
                Some(json!({ "user_id": response.user_id, "session": user })),
            )
        }
        AuthCommands::Register { email, password } => {
            let response = apis::auth::register(client, &RegisterRequest { email, password })
                .await
                .map_err(|e| request_failed(&output_format, e))?;
            session.establish(&response.tokens)?;

            output_success(
                &output_format,
                "Registered and logged in",
                Some(json!({ "user_id": response.user_id })),
            )
        }
        AuthCommands::Logout => {
            let cleared = session.sign_out(client).await;
            let message = if cleared { "Logged out" } else { "Not logged in" };
            output_success(&output_format, message, Some(json!({ "cleared": cleared })))
        }
        AuthCommands::Refresh => {
            session
                .refresh_access(client)
                .await
                .map_err(|e| session_failed(&output_format, e))?;
            output_success(&output_format, "Access token refreshed", None)
        }
        AuthCommands::Status => {
            let authenticated = session.is_authenticated();
            let message = if authenticated { "Authenticated" } else { "Anonymous" };
            output_success(
                &output_format,
                message,
                Some(json!({
                    "authenticated": authenticated,
                    "has_refresh_token": session.refresh_token().is_some(),
                })),
            )
        }
        AuthCommands::Whoami => {
            let user = session
                .get_info(client)
                .await
                .map_err(|e| session_failed(&output_format, e))?;
            output_record(&output_format, &user)
        }
    }
}
