use clap::Subcommand;
use serde_json::json;

use crate::apis::knowledge::{self, EntryInput, EntryQuery, TopicInput};
use crate::cli::utils::{
    output_empty_collection, output_record, output_success, request_failed, split_list,
};
use crate::cli::OutputFormat;
use crate::console::Console;

#[derive(Subcommand)]
pub enum TopicCommands {
    #[command(about = "List topics")]
    List,

    #[command(about = "Create a topic")]
    Create {
        #[arg(help = "Topic name")]
        name: String,
        #[arg(long, help = "Description")]
        desc: Option<String>,
    },

    #[command(about = "Rename or describe a topic")]
    Update {
        #[arg(help = "Topic id")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        desc: Option<String>,
    },

    #[command(about = "Delete a topic")]
    Delete {
        #[arg(help = "Topic id")]
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum EntryCommands {
    #[command(about = "Search knowledge entries")]
    List {
        #[arg(long, help = "Match title or content")]
        keyword: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        topic: Option<i64>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },

    #[command(about = "Create a knowledge entry")]
    Create {
        #[arg(help = "Entry title")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, help = "Comma separated tags")]
        tags: Option<String>,
        #[arg(long, help = "Comma separated links")]
        links: Option<String>,
        #[arg(long)]
        topic: Option<i64>,
    },

    #[command(about = "Update fields of a knowledge entry")]
    Update {
        #[arg(help = "Entry id")]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, help = "Comma separated tags")]
        tags: Option<String>,
        #[arg(long, help = "Comma separated links")]
        links: Option<String>,
        #[arg(long)]
        topic: Option<i64>,
    },

    #[command(about = "Delete a knowledge entry")]
    Delete {
        #[arg(help = "Entry id")]
        id: i64,
    },
}

pub async fn handle_topics(
    cmd: TopicCommands,
    console: &Console,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = &console.client;
    let fail = |e| request_failed(&output_format, e);

    match cmd {
        TopicCommands::List => {
            let topics = knowledge::list_topics(client).await.map_err(fail)?;
            if topics.items.is_empty() {
                return output_empty_collection(&output_format, "topics", "No topics yet");
            }
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&topics)?);
                }
                OutputFormat::Text => {
                    println!("{:<6} {:<24} {}", "ID", "NAME", "DESCRIPTION");
                    println!("{}", "-".repeat(60));
                    for topic in &topics.items {
                        println!(
                            "{:<6} {:<24} {}",
                            topic.id,
                            topic.name,
                            topic.desc.as_deref().unwrap_or("")
                        );
                    }
                }
            }
            Ok(())
        }
        TopicCommands::Create { name, desc } => {
            let input = TopicInput {
                name: Some(name),
                desc,
            };
            let topic = knowledge::create_topic(client, &input).await.map_err(fail)?;
            output_record(&output_format, &topic)
        }
        TopicCommands::Update { id, name, desc } => {
            let topic = knowledge::update_topic(client, id, &TopicInput { name, desc })
                .await
                .map_err(fail)?;
            output_record(&output_format, &topic)
        }
        TopicCommands::Delete { id } => {
            knowledge::delete_topic(client, id).await.map_err(fail)?;
            output_success(&output_format, &format!("Topic {} deleted", id), Some(json!({ "id": id })))
        }
    }
}

pub async fn handle_entries(
    cmd: EntryCommands,
    console: &Console,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = &console.client;
    let fail = |e| request_failed(&output_format, e);

    match cmd {
        EntryCommands::List {
            keyword,
            tag,
            topic,
            page,
            page_size,
        } => {
            let query = EntryQuery {
                keyword,
                tag,
                topic_id: topic,
                page,
                page_size,
            };
            let entries = knowledge::list_entries(client, &query).await.map_err(fail)?;
            if entries.items.is_empty() {
                return output_empty_collection(&output_format, "items", "No entries found");
            }
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                OutputFormat::Text => {
                    println!("{:<6} {:<36} {:<24} {}", "ID", "TITLE", "TAGS", "UPDATED");
                    println!("{}", "-".repeat(90));
                    for entry in &entries.items {
                        println!(
                            "{:<6} {:<36} {:<24} {}",
                            entry.id,
                            entry.title,
                            entry.tags.join(","),
                            entry.updated_at
                        );
                    }
                    println!(
                        "page {} ({} per page), {} total",
                        entries.page, entries.page_size, entries.total
                    );
                }
            }
            Ok(())
        }
        EntryCommands::Create {
            title,
            content,
            tags,
            links,
            topic,
        } => {
            let input = EntryInput {
                title: Some(title),
                content: Some(content),
                tags: Some(split_list(tags).unwrap_or_default()),
                links: Some(split_list(links).unwrap_or_default()),
                topic_id: topic,
            };
            let entry = knowledge::create_entry(client, &input).await.map_err(fail)?;
            output_record(&output_format, &entry)
        }
        EntryCommands::Update {
            id,
            title,
            content,
            tags,
            links,
            topic,
        } => {
            let input = EntryInput {
                title,
                content,
                tags: split_list(tags),
                links: split_list(links),
                topic_id: topic,
            };
            let entry = knowledge::update_entry(client, id, &input).await.map_err(fail)?;
            output_record(&output_format, &entry)
        }
        EntryCommands::Delete { id } => {
            knowledge::delete_entry(client, id).await.map_err(fail)?;
            output_success(&output_format, &format!("Entry {} deleted", id), Some(json!({ "id": id })))
        }
    }
}
