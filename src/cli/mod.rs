pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "ebbing")]
#[command(about = "Ebbing CLI - Command-line console for the Ebbing study backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Knowledge topics")]
    Topics {
        #[command(subcommand)]
        cmd: commands::knowledge::TopicCommands,
    },

    #[command(about = "Knowledge entries")]
    Entries {
        #[command(subcommand)]
        cmd: commands::knowledge::EntryCommands,
    },

    #[command(about = "Study log history")]
    Study {
        #[command(subcommand)]
        cmd: commands::study::StudyCommands,
    },

    #[command(about = "Study plans")]
    Plans {
        #[command(subcommand)]
        cmd: commands::plans::PlanCommands,
    },

    #[command(about = "Tasks within a plan")]
    Tasks {
        #[command(subcommand)]
        cmd: commands::plans::TaskCommands,
    },

    #[command(about = "Evaluate console navigation against the current session")]
    Nav {
        #[command(subcommand)]
        cmd: commands::nav::NavCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let console = config::open_console()?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &console, output_format).await,
        Commands::Topics { cmd } => commands::knowledge::handle_topics(cmd, &console, output_format).await,
        Commands::Entries { cmd } => commands::knowledge::handle_entries(cmd, &console, output_format).await,
        Commands::Study { cmd } => commands::study::handle(cmd, &console, output_format).await,
        Commands::Plans { cmd } => commands::plans::handle_plans(cmd, &console, output_format).await,
        Commands::Tasks { cmd } => commands::plans::handle_tasks(cmd, &console, output_format).await,
        Commands::Nav { cmd } => commands::nav::handle(cmd, &console, output_format).await,
    }
}
