use clap::{Parser, Subcommand};
use log::LevelFilter;
use log4rs::Config;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Logger, Root};
use task_tracker::store::{self, TaskRepository};
use task_tracker::task::{Status, StatusFilter};

#[derive(Parser, Debug)]
#[command(name = "task-tracker", about = "A simple CLI task manager.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Description of the task
        description: String,
    },
    /// Delete a task
    Delete {
        /// ID of the task to delete
        task_id: String,
    },
    /// Clean all tasks
    Clean,
    /// Update task status
    Update {
        /// ID of the task to update
        task_id: String,
        /// New status (todo, in-progress, done)
        #[arg(value_enum, ignore_case = true)]
        new_status: Status,
    },
    /// List tasks
    List {
        /// Filter tasks by status
        #[arg(long = "status_filter", value_enum, default_value_t = StatusFilter::All)]
        status_filter: StatusFilter,
    },
}

fn init_logging() {
    let stdout = ConsoleAppender::builder().build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .logger(Logger::builder().build("task_tracker", LevelFilter::Info))
        .build(Root::builder().appender("stdout").build(LevelFilter::Warn))
        .expect("valid logging configuration");
    let _log4rs_handle = log4rs::init_config(config).expect("logging initialized once");
}

fn main() -> anyhow::Result<()> {
    // Usage errors exit here, before any file access.
    let args = Cli::parse();
    init_logging();

    let path = store::task_file_path();
    let mut tasks = TaskRepository::load(&path)?;

    match args.command {
        Commands::Add { description } => {
            let id = tasks.add(description);
            println!("Task added successfully (ID: {})", id);
        }
        Commands::Delete { task_id } => {
            println!("{}", tasks.delete(&task_id));
        }
        Commands::Clean => {
            println!("{}", tasks.clean());
        }
        Commands::Update {
            task_id,
            new_status,
        } => {
            println!("{}", tasks.update_status(&task_id, new_status.as_str()));
        }
        Commands::List { status_filter } => {
            println!("{}", tasks.list(status_filter));
        }
    }

    // Every invocation re-persists, list included; the save renumbers IDs
    // to a contiguous 1..N.
    tasks.save(&path)?;
    Ok(())
}
