use clap::Subcommand;
use serde_json::json;

use crate::cli::commands::session_failed;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::console::Console;
use crate::session::Session;

#[derive(Subcommand)]
pub enum NavCommands {
    #[command(about = "Show where navigating to a console path would land")]
    Open {
        #[arg(help = "Console path, e.g. /plans")]
        path: String,
    },

    #[command(about = "List menu routes visible to the current user")]
    Menu,
}

pub async fn handle(cmd: NavCommands, console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    let guard = &console.guard;

    match cmd {
        NavCommands::Open { path } => {
            current_session(console, &output_format).await?;
            let navigation = guard.navigate(&path)?;
            output_success(
                &output_format,
                &format!("{} -> {}", navigation.requested, navigation.resolved),
                Some(serde_json::to_value(&navigation)?),
            )
        }
        NavCommands::Menu => {
            let session = current_session(console, &output_format).await?;
            let paths: Vec<&str> = guard
                .table()
                .visible_routes(&session.roles)
                .filter(|route| !route.requires_auth || session.is_authenticated())
                .map(|route| route.path.as_str())
                .collect();
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "routes": paths }))?);
                }
                OutputFormat::Text => {
                    for path in paths {
                        println!("{}", path);
                    }
                }
            }
            Ok(())
        }
    }
}

/// Session with roles loaded; roles are not persisted between runs
async fn current_session(console: &Console, output_format: &OutputFormat) -> anyhow::Result<Session> {
    if !console.session.is_authenticated() {
        return Ok(console.session.snapshot());
    }
    console
        .session
        .get_info(&console.client)
        .await
        .map_err(|e| session_failed(output_format, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::ConsoleConfig;
    use crate::session::{MemoryCredentialStore, TokenPair};
    use crate::testing::RecordingNotifier;

    async fn console_against(server: &MockServer) -> Console {
        let mut config = ConsoleConfig::development();
        config.api.base_url = format!("{}/api", server.uri());
        Console::from_config_with(
            &config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn authenticated_session_has_roles_loaded_before_routing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "ok",
                "data": {"id": 1, "email": "ed@example.com", "roles": ["editor"]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let console = console_against(&server).await;
        console.session.establish(&TokenPair::new("a", "r")).unwrap();

        let session = current_session(&console, &OutputFormat::Text).await.unwrap();

        assert!(session.roles.contains("editor"));
        assert!(console.session.snapshot().roles.contains("editor"));
    }

    #[tokio::test]
    async fn anonymous_session_skips_the_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        let console = console_against(&server).await;

        let session = current_session(&console, &OutputFormat::Text).await.unwrap();

        assert!(session.is_anonymous());
    }
}
