use clap::Subcommand;
use serde_json::json;

use crate::apis::plans::{self, PlanInput, PlanQuery, PlanStatus, TaskInput, TaskStatus};
use crate::cli::utils::{
    output_empty_collection, output_record, output_success, request_failed, split_list,
};
use crate::cli::OutputFormat;
use crate::console::Console;

#[derive(Subcommand)]
pub enum PlanCommands {
    #[command(about = "List plans")]
    List {
        #[arg(long, value_enum)]
        status: Option<PlanStatus>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },

    #[command(about = "Show a plan with its tasks")]
    Show {
        #[arg(help = "Plan id")]
        id: i64,
    },

    #[command(about = "Create a plan")]
    Create {
        #[arg(help = "Plan title")]
        title: String,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long, help = "YYYY-MM-DD")]
        deadline: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, help = "Comma separated tags")]
        tags: Option<String>,
    },

    #[command(about = "Update fields of a plan")]
    Update {
        #[arg(help = "Plan id")]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, help = "Comma separated tags")]
        tags: Option<String>,
        #[arg(long, value_enum)]
        status: Option<PlanStatus>,
    },

    #[command(about = "Delete a plan and its tasks")]
    Delete {
        #[arg(help = "Plan id")]
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "Add a task to a plan")]
    Create {
        #[arg(help = "Plan id")]
        plan_id: i64,
        #[arg(help = "Task title")]
        title: String,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, help = "Estimated minutes")]
        estimate: Option<u32>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, help = "YYYY-MM-DD")]
        due: Option<String>,
    },

    #[command(about = "Update fields of a task")]
    Update {
        #[arg(help = "Task id")]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, help = "Estimated minutes")]
        estimate: Option<u32>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        #[arg(long, help = "YYYY-MM-DD")]
        due: Option<String>,
    },

    #[command(about = "Mark a task done")]
    Complete {
        #[arg(help = "Task id")]
        id: i64,
    },
}

pub async fn handle_plans(
    cmd: PlanCommands,
    console: &Console,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = &console.client;
    let fail = |e| request_failed(&output_format, e);

    match cmd {
        PlanCommands::List {
            status,
            priority,
            tag,
        } => {
            let query = PlanQuery {
                status,
                priority,
                tag,
                ..PlanQuery::default()
            };
            let listing = plans::list_plans(client, &query).await.map_err(fail)?;
            if listing.items.is_empty() {
                return output_empty_collection(&output_format, "items", "No plans found");
            }
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&listing)?);
                }
                OutputFormat::Text => {
                    println!(
                        "{:<6} {:<32} {:<12} {:<8} {:>8}  {}",
                        "ID", "TITLE", "STATUS", "PRIORITY", "PROGRESS", "DEADLINE"
                    );
                    println!("{}", "-".repeat(90));
                    for plan in &listing.items {
                        println!(
                            "{:<6} {:<32} {:<12} {:<8} {:>7.0}%  {}",
                            plan.id,
                            plan.title,
                            plan.status.as_str(),
                            plan.priority,
                            plan.progress,
                            plan.deadline.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
            Ok(())
        }
        PlanCommands::Show { id } => {
            let detail = plans::get_plan(client, id).await.map_err(fail)?;
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&detail)?);
                }
                OutputFormat::Text => {
                    output_record(&output_format, &detail.plan)?;
                    println!();
                    for task in &detail.tasks {
                        let mark = if task.status == TaskStatus::Done { "x" } else { " " };
                        println!("[{}] {:<6} {}", mark, task.id, task.title);
                    }
                }
            }
            Ok(())
        }
        PlanCommands::Create {
            title,
            goal,
            deadline,
            priority,
            tags,
        } => {
            let input = PlanInput {
                title: Some(title),
                goal,
                deadline,
                priority,
                tags: split_list(tags),
                status: None,
            };
            let plan = plans::create_plan(client, &input).await.map_err(fail)?;
            output_record(&output_format, &plan)
        }
        PlanCommands::Update {
            id,
            title,
            goal,
            deadline,
            priority,
            tags,
            status,
        } => {
            let input = PlanInput {
                title,
                goal,
                deadline,
                priority,
                tags: split_list(tags),
                status,
            };
            let plan = plans::update_plan(client, id, &input).await.map_err(fail)?;
            output_record(&output_format, &plan)
        }
        PlanCommands::Delete { id } => {
            plans::delete_plan(client, id).await.map_err(fail)?;
            output_success(&output_format, &format!("Plan {} deleted", id), Some(json!({ "id": id })))
        }
    }
}

pub async fn handle_tasks(
    cmd: TaskCommands,
    console: &Console,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = &console.client;
    let fail = |e| request_failed(&output_format, e);

    let task = match cmd {
        TaskCommands::Create {
            plan_id,
            title,
            desc,
            estimate,
            priority,
            due,
        } => {
            let input = TaskInput {
                title: Some(title),
                desc,
                estimate_minutes: estimate,
                priority,
                due_date: due,
                ..TaskInput::default()
            };
            plans::create_task(client, plan_id, &input).await.map_err(fail)?
        }
        TaskCommands::Update {
            id,
            title,
            desc,
            estimate,
            priority,
            status,
            due,
        } => {
            let input = TaskInput {
                title,
                desc,
                estimate_minutes: estimate,
                priority,
                status,
                due_date: due,
                tags: None,
            };
            plans::update_task(client, id, &input).await.map_err(fail)?
        }
        TaskCommands::Complete { id } => plans::complete_task(client, id).await.map_err(fail)?,
    };

    output_record(&output_format, &task)
}
