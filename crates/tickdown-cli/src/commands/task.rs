//! Task management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use tickdown_core::report::fmt_mm_ss;
use tickdown_core::{CoreError, DateKey, Task, TaskStore, TimerState};

use super::common::{confirm, open_kv};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task in today's bucket
    Add {
        /// Task name
        name: String,
        /// Countdown minutes (0:00 total makes a plain task)
        #[arg(long, default_value = "0")]
        minutes: u64,
        /// Countdown seconds
        #[arg(long, default_value = "0")]
        seconds: u64,
    },
    /// List tasks
    List {
        /// Date to list (YYYY-MM-DD; default: today)
        #[arg(long)]
        date: Option<DateKey>,
        /// List every day instead of one
        #[arg(long)]
        all: bool,
        /// Print JSON instead of text lines
        #[arg(long)]
        json: bool,
    },
    /// Start (or resume) a task's countdown
    Start {
        /// Task ID
        id: String,
        /// Stop any other running task without asking
        #[arg(long)]
        yes: bool,
    },
    /// Pause a running countdown
    Stop {
        /// Task ID
        id: String,
    },
    /// Toggle completion
    Done {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
        /// Delete even if the task is running, without asking
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let kv = open_kv();
    let mut store = TaskStore::load(kv.as_ref())?;

    match action {
        TaskAction::Add {
            name,
            minutes,
            seconds,
        } => {
            let (task, event) = store.add_task(&name, minutes, seconds, DateKey::today())?;
            store.save(kv.as_ref())?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TaskAction::List { date, all, json } => {
            let now = Utc::now();
            if all {
                if json {
                    println!("{}", serde_json::to_string_pretty(store.days())?);
                } else {
                    for (day, tasks) in store.days() {
                        println!("{day}");
                        for task in tasks {
                            print_task_line(task, now);
                        }
                        println!();
                    }
                }
            } else {
                let date = date.unwrap_or_else(DateKey::today);
                let tasks = store.tasks_on(date);
                if json {
                    println!("{}", serde_json::to_string_pretty(tasks)?);
                } else if tasks.is_empty() {
                    println!("No tasks on {date}.");
                } else {
                    println!("{date}");
                    for task in tasks {
                        print_task_line(task, now);
                    }
                }
            }
        }
        TaskAction::Start { id, yes } => {
            let events = if yes {
                store.start_task_confirmed(&id, Utc::now())?
            } else {
                match store.start_task(&id, Utc::now()) {
                    Ok(event) => vec![event],
                    Err(CoreError::ConfirmationRequired(c)) => {
                        if confirm(&format!("{c}. Stop it and start this task?"))? {
                            store.start_task_confirmed(&id, Utc::now())?
                        } else {
                            println!("aborted");
                            return Ok(());
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            };
            store.save(kv.as_ref())?;
            for event in &events {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        TaskAction::Stop { id } => {
            let event = store.stop_task(&id, Utc::now())?;
            store.save(kv.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TaskAction::Done { id } => {
            let event = store.toggle_complete(&id)?;
            store.save(kv.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TaskAction::Delete { id, yes } => {
            let event = if yes {
                store.delete_task_confirmed(&id)?
            } else {
                match store.delete_task(&id) {
                    Ok(event) => event,
                    Err(CoreError::ConfirmationRequired(c)) => {
                        if confirm(&format!("{c}. Delete it anyway?"))? {
                            store.delete_task_confirmed(&id)?
                        } else {
                            println!("aborted");
                            return Ok(());
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            };
            store.save(kv.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }
    Ok(())
}

fn print_task_line(task: &Task, now: DateTime<Utc>) {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };
    let timer = if !task.has_timer {
        "no timer".to_string()
    } else {
        match task.timer {
            TimerState::Running { .. } => {
                format!("{} remaining", fmt_mm_ss(task.remaining_secs(now)))
            }
            TimerState::Paused { remaining_secs } => {
                format!("paused at {}", fmt_mm_ss(remaining_secs))
            }
            TimerState::Idle => fmt_mm_ss(task.duration_secs),
        }
    };
    println!("{checkbox} {}  {}  ({timer})", task.id, task.name);
}
