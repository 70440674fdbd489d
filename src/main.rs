//! # TD - Team Task Dashboard
//!
//! A role-based task dashboard over an in-memory task store, with a CLI for
//! reports and an interactive kanban board in the terminal.
//!
//! ## Key Features
//!
//! - **Role-aware views**: admins and managers see every task, members see their own
//! - **Single-owner store**: one store mutates the task collection and publishes
//!   snapshots to subscribers (the board redraws from them)
//! - **Derived reports**: per-project completion, overdue work, daily standup summaries
//!   and team workload, all computed on demand
//! - **Mock AI analysis**: canned project health reports and suggested tasks that can be
//!   accepted into the backlog
//!
//! ## Quick Start
//!
//! ```bash
//! # Kanban board as the default manager
//! td board
//!
//! # Dashboard as a member, pinned to a date
//! td --role member --as-of 2025-01-24 dashboard
//!
//! # Overdue tasks as JSON
//! td list --overdue --json
//! ```
//!
//! Nothing is stored on disk: every invocation starts from the seeded reference
//! dataset. Set `RUST_LOG` (or pass `--verbose`) to see store activity on stderr.

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod analysis;
pub mod cli;
pub mod clock;
pub mod cmd;
pub mod config;
pub mod display;
pub mod error;
pub mod fields;
pub mod project;
pub mod queries;
pub mod report;
pub mod seed;
pub mod session;
pub mod store;
pub mod task;
pub mod user;
pub mod validate;
pub mod tui {
    pub mod board;
    pub mod board_run;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod task_form;
}

use cli::Cli;
use cmd::*;
use config::Settings;
use error::Result;

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_cli(&cli)?;
    init_tracing(&settings);

    let workspace = || Workspace::seeded(&settings);
    match cli.command {
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Board => cmd_board(workspace()?),
        Commands::List { status, project, assignee, overdue, json } => {
            cmd_list(&workspace()?, status, project, assignee, overdue, json)
        }
        Commands::View { id, json } => cmd_view(&workspace()?, id, json),
        Commands::Stats { project, json } => cmd_stats(&workspace()?, project, json),
        Commands::Dashboard { json } => cmd_dashboard(&workspace()?, json),
        Commands::Report { json } => cmd_report(&workspace()?, json),
        Commands::Team => cmd_team(&workspace()?),
        Commands::Analyze { project } => cmd_analyze(&workspace()?, project),
        Commands::Suggest { project, accept, assign } => {
            cmd_suggest(&mut workspace()?, project, accept, assign)
        }
        Commands::Users => cmd_users(&workspace()?),
        Commands::Projects => cmd_projects(&workspace()?),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
