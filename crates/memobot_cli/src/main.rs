//! Command-line driver for the memobot review queue.
//!
//! # Responsibility
//! - Resolve configuration and logging, then dispatch one service call.
//! - Own the single wall-clock read; `--today` overrides it.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use memobot_core::{
    core_version, init_logging_from_config, CoreConfig, SqliteTaskStore, Task, TaskService,
};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "memobot", version, about = "Review tasks that come back when you need them")]
struct Cli {
    /// Database file; overrides MEMOBOT_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print records as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Day to evaluate against (YYYY-MM-DD); defaults to the local date.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a task that is due immediately.
    Add {
        name: String,
        #[arg(long)]
        url: Option<String>,
    },
    /// Show tasks that are due.
    Due,
    /// Show every task.
    List,
    /// Rate a task: easy, hard or again.
    Rate { id: Uuid, rating: String },
    /// Delete a task.
    Delete { id: Uuid },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }

    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }
    log::info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let store = SqliteTaskStore::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let service = TaskService::with_config(store, config.scheduler);
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command {
        Command::Add { name, url } => {
            let task = service.create_task(&name, url.as_deref(), today)?;
            print_tasks(&[task], cli.json)?;
        }
        Command::Due => print_tasks(&service.list_due_tasks(today)?, cli.json)?,
        Command::List => print_tasks(&service.list_tasks()?, cli.json)?,
        Command::Rate { id, rating } => {
            let task = service.rate_task_raw(id, &rating, today)?;
            print_tasks(&[task], cli.json)?;
        }
        Command::Delete { id } => {
            service.delete_task(id)?;
            if cli.json {
                println!("{}", deleted_json(id));
            } else {
                println!("deleted {id}");
            }
        }
    }
    Ok(())
}

fn print_tasks(tasks: &[Task], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    for task in tasks {
        println!(
            "{}  due {}  every {}d  streak {}  {}{}",
            task.id,
            task.due_date,
            task.interval_days,
            task.streak,
            task.name,
            task.url
                .as_deref()
                .map(|url| format!("  <{url}>"))
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn deleted_json(id: Uuid) -> serde_json::Value {
    serde_json::json!({ "deleted": id.to_string() })
}
