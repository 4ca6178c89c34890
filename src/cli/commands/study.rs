use clap::Subcommand;

use crate::apis::study::{self, StudyLogInput};
use crate::cli::utils::{output_empty_collection, output_record, request_failed};
use crate::cli::OutputFormat;
use crate::console::Console;

#[derive(Subcommand)]
pub enum StudyCommands {
    #[command(about = "List study logs; the backend defaults to the last week")]
    List {
        #[arg(long, help = "First day, YYYY-MM-DD")]
        from: Option<String>,
        #[arg(long, help = "Last day, YYYY-MM-DD")]
        to: Option<String>,
    },

    #[command(about = "Record a study session for an entry")]
    Log {
        #[arg(help = "Knowledge entry id")]
        entry_id: i64,
        #[arg(long)]
        note: Option<String>,
        #[arg(long, help = "When it happened (RFC 3339); defaults to now")]
        at: Option<String>,
    },
}

pub async fn handle(cmd: StudyCommands, console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = &console.client;

    match cmd {
        StudyCommands::List { from, to } => {
            let window = study::list_logs(client, from.as_deref(), to.as_deref())
                .await
                .map_err(|e| request_failed(&output_format, e))?;
            if window.items.is_empty() {
                return output_empty_collection(&output_format, "items", "No study logs in range");
            }
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&window)?);
                }
                OutputFormat::Text => {
                    println!("Study logs {} .. {}", window.start_date, window.end_date);
                    println!("{:<6} {:<8} {:<26} {}", "ID", "ENTRY", "LOGGED", "NOTE");
                    println!("{}", "-".repeat(70));
                    for log in &window.items {
                        println!(
                            "{:<6} {:<8} {:<26} {}",
                            log.id,
                            log.entry_id,
                            log.logged_at,
                            log.note.as_deref().unwrap_or("")
                        );
                    }
                }
            }
            Ok(())
        }
        StudyCommands::Log { entry_id, note, at } => {
            let input = StudyLogInput {
                entry_id,
                note,
                logged_at: at,
            };
            let log = study::create_log(client, &input)
                .await
                .map_err(|e| request_failed(&output_format, e))?;
            output_record(&output_format, &log)
        }
    }
}
