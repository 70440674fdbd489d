//! Command implementations for the CLI interface.
//!
//! Every run seeds a fresh store, so the read-only commands report on the
//! reference dataset (as seen by the selected role and date) and the
//! mutating work happens inside the board session or through `suggest --accept`.

use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis;
use crate::config::Settings;
use crate::display::*;
use crate::error::{Error, Result};
use crate::fields::*;
use crate::project::resolve_project;
use crate::queries;
use crate::report::{latest_manager_comments, team_workload, DailyReport, DashboardMetrics};
use crate::seed;
use crate::session::Session;
use crate::store::TaskStore;
use crate::task::{Assignee, Task};
use crate::tui::board_run::run_board;
use crate::user::resolve_user;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the kanban board.
    Board,

    /// List tasks visible to the current role.
    List {
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by project ID or name.
        #[arg(long)]
        project: Option<String>,
        /// Filter by assignee ID, name or email.
        #[arg(long)]
        assignee: Option<String>,
        /// Only tasks past their due date and not done.
        #[arg(long)]
        overdue: bool,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show a single task with its comments.
    View {
        /// Task ID.
        id: TaskId,
        #[arg(long)]
        json: bool,
    },

    /// Per-project progress.
    Stats {
        /// Restrict to one project (ID or name).
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Dashboard overview for the current role.
    Dashboard {
        #[arg(long)]
        json: bool,
    },

    /// Daily standup report for the current user.
    Report {
        #[arg(long)]
        json: bool,
    },

    /// Task load per team member.
    Team,

    /// AI health analysis of a project.
    Analyze {
        /// Project ID or name.
        project: String,
    },

    /// AI task suggestions for a project.
    Suggest {
        /// Project ID or name.
        project: String,
        /// Add the suggestions to the store as AI-generated tasks.
        #[arg(long)]
        accept: bool,
        /// Assign accepted suggestions to this user instead of leaving them pending.
        #[arg(long, requires = "accept")]
        assign: Option<String>,
    },

    /// List users.
    Users,

    /// List projects.
    Projects,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Store plus session for one run.
pub struct Workspace {
    pub store: TaskStore,
    pub session: Session,
}

impl Workspace {
    /// Seed a store from the reference dataset and pick the acting user.
    pub fn seeded(settings: &Settings) -> Result<Self> {
        let store = TaskStore::new(seed::directory(), seed::tasks(), settings.clock());
        let mut session = Session::new(store.directory().users().to_vec())
            .ok_or_else(|| Error::Other("No users in the reference dataset".into()))?;
        if let Some(role) = settings.role {
            if !session.switch_role(role) {
                warn!(
                    "No user with role {}; staying as {}",
                    format_role(role),
                    session.current_user().name
                );
            }
        }
        info!(
            "Seeded {} tasks, acting as {}",
            store.tasks().len(),
            session.current_user().name
        );
        Ok(Workspace { store, session })
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve_project_arg(ws: &Workspace, project: &str) -> Result<ProjectId> {
    resolve_project(project, ws.store.directory().projects()).map_err(Error::NotFound)
}

/// Launch the terminal kanban board.
pub fn cmd_board(ws: Workspace) -> Result<()> {
    let Workspace { store, session } = ws;
    run_board(store, session)?;
    Ok(())
}

/// List tasks with optional filters.
pub fn cmd_list(
    ws: &Workspace,
    status: Option<Status>,
    project: Option<String>,
    assignee: Option<String>,
    overdue: bool,
    json: bool,
) -> Result<()> {
    let project_id = project.map(|p| resolve_project_arg(ws, &p)).transpose()?;
    let assignee_id = assignee
        .map(|a| resolve_user(&a, ws.store.directory().users()).map_err(Error::NotFound))
        .transpose()?;
    let today = ws.store.today();

    let filtered: Vec<&Task> = ws
        .store
        .visible_to(ws.session.current_user())
        .into_iter()
        .filter(|t| status.map_or(true, |s| t.status() == s))
        .filter(|t| project_id.map_or(true, |p| t.project_id == p))
        .filter(|t| assignee_id.map_or(true, |a| t.assignee_id() == Some(a)))
        .filter(|t| !overdue || t.is_overdue(today))
        .collect();

    if json {
        return print_json(&filtered);
    }
    if filtered.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_table(&filtered, ws.store.directory(), today);
    Ok(())
}

/// View detailed information about a specific task.
pub fn cmd_view(ws: &Workspace, id: TaskId, json: bool) -> Result<()> {
    let task = ws
        .store
        .visible_to(ws.session.current_user())
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::NotFound(format!("Task with ID {} not found", id)))?;
    if json {
        return print_json(task);
    }

    let today = ws.store.today();
    let dir = ws.store.directory();
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", format_status(task.status()));
    println!("Priority:     {}", format_priority(task.priority));
    println!("Project:      {}", project_label(dir, task.project_id));
    println!("Assignee:     {}", task.assignee_name().unwrap_or("Unassigned"));
    println!(
        "Due:          {}",
        match task.due_date {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    if let Some(reason) = &task.blocker_reason {
        println!("Blocker:      {}", reason);
    }
    println!("Created UTC:  {}", task.created_at.to_rfc3339());
    println!("Updated UTC:  {}", task.updated_at.to_rfc3339());
    if let Some(done) = task.completed_at() {
        println!("Completed:    {}", done.to_rfc3339());
    }
    if task.update_requested {
        println!("Update requested by management.");
    }
    if task.ai_generated {
        println!("Suggested by AI analysis.");
    }
    println!("Description:\n{}\n", task.description.as_deref().unwrap_or("-"));

    if task.comments.is_empty() {
        println!("Comments: -");
    } else {
        println!("Comments:");
        for c in &task.comments {
            println!(
                "  [{}] {} ({}): {}",
                c.created_at.format("%Y-%m-%d %H:%M"),
                c.user_name,
                format_role(c.user_role),
                c.content
            );
            if let Some(link) = &c.link {
                println!("      link: {}", link);
            }
            if let Some(image) = &c.image_url {
                println!("      image: {}", image);
            }
        }
    }
    Ok(())
}

/// Per-project progress table.
pub fn cmd_stats(ws: &Workspace, project: Option<String>, json: bool) -> Result<()> {
    let dir = ws.store.directory();
    let ids: Vec<ProjectId> = match project {
        Some(p) => vec![resolve_project_arg(ws, &p)?],
        None => dir.projects().iter().map(|p| p.id).collect(),
    };
    let stats: Vec<queries::ProjectStats> =
        ids.iter().map(|id| ws.store.project_stats(*id)).collect();

    if json {
        return print_json(&stats);
    }
    println!(
        "{:<4} {:<24} {:>5} {:>5} {:>5} {:>5} {:>5}  {}",
        "ID", "Project", "Total", "Done", "Prog", "Block", "Pend", "Completion"
    );
    for s in &stats {
        println!(
            "{:<4} {:<24} {:>5} {:>5} {:>5} {:>5} {:>5}  {} {}%",
            s.project_id,
            truncate(&project_label(dir, s.project_id), 24),
            s.total,
            s.completed,
            s.in_progress,
            s.blocked,
            s.pending,
            progress_bar(s.completion_rate, 20),
            s.completion_rate
        );
        for note in latest_manager_comments(ws.store.tasks(), s.project_id, 3) {
            println!(
                "       \u{2514} {} on \"{}\": {}",
                note.comment.user_name,
                note.task_title,
                truncate(&note.comment.content, 60)
            );
        }
    }
    Ok(())
}

/// Dashboard overview scoped to the current role.
pub fn cmd_dashboard(ws: &Workspace, json: bool) -> Result<()> {
    let user = ws.session.current_user();
    let today = ws.store.today();
    let visible = ws.store.visible_to(user);
    let metrics = DashboardMetrics::compute(visible.iter().copied(), today);
    if json {
        return print_json(&metrics);
    }

    let dir = ws.store.directory();
    let active = dir
        .projects()
        .iter()
        .filter(|p| p.status == ProjectStatus::Active)
        .count();
    println!("{} dashboard ({})", format_role(user.role), user.name);
    println!("Projects:        {} ({} active)", dir.projects().len(), active);
    println!("Total tasks:     {}", metrics.total);
    println!("  Pending:       {}", metrics.pending);
    println!("  To do:         {}", metrics.todo);
    println!("  In progress:   {}", metrics.in_progress);
    println!(
        "  Completed:     {} ({}% completion rate)",
        metrics.completed, metrics.completion_rate
    );
    println!("  Blocked:       {}", metrics.blocked);
    println!("  Overdue:       {}", metrics.overdue);
    println!("Needs attention: {}", metrics.needs_attention);

    let overdue: Vec<&Task> = ws
        .store
        .overdue_tasks()
        .into_iter()
        .filter(|t| visible.iter().any(|v| v.id == t.id))
        .take(3)
        .collect();
    if !overdue.is_empty() {
        println!("\nOverdue:");
        for t in overdue {
            println!("  #{} {} ({})", t.id, t.title, format_due_relative(t.due_date, today));
        }
    }
    Ok(())
}

/// Daily standup report for the current user.
pub fn cmd_report(ws: &Workspace, json: bool) -> Result<()> {
    let user = ws.session.current_user();
    let report = DailyReport::compute(ws.store.visible_to(user), user, ws.store.now());
    if json {
        return print_json(&report);
    }

    println!("Daily report for {}, {}", user.name, report.generated_at.format("%A, %B %d, %Y"));
    let sections: [(&str, &Vec<&Task>, &str); 3] = [
        ("Completed yesterday", &report.completed_yesterday, "No tasks completed yesterday"),
        ("In progress today", &report.in_progress, "Nothing in progress"),
        ("Blockers", &report.blockers, "No blockers"),
    ];
    for (title, tasks, empty) in sections {
        println!("\n{} ({})", title, tasks.len());
        if tasks.is_empty() {
            println!("  {}", empty);
        }
        for t in tasks {
            println!("  #{} {} [{}]", t.id, t.title, t.assignee_name().unwrap_or("-"));
            if t.status() == Status::Blocked {
                if let Some(reason) = &t.blocker_reason {
                    println!("      reason: {}", reason);
                }
            }
        }
    }

    let blocked = report.blockers.len();
    println!(
        "\nSummary: {} completed yesterday, {} in progress, {} task{} blocked{}",
        report.completed_yesterday.len(),
        report.in_progress.len(),
        blocked,
        if blocked != 1 { "s" } else { "" },
        if blocked > 0 { " - requires immediate attention" } else { "" }
    );
    Ok(())
}

/// Task counts per team member.
pub fn cmd_team(ws: &Workspace) -> Result<()> {
    println!(
        "{:<4} {:<14} {:<22} {:>5} {:>5} {:>5}",
        "ID", "Name", "Email", "Tasks", "Done", "Open"
    );
    for m in team_workload(ws.store.tasks(), ws.store.directory().users()) {
        println!(
            "{:<4} {:<14} {:<22} {:>5} {:>5} {:>5}",
            m.user_id, m.name, m.email, m.task_count, m.completed_count, m.open_count
        );
    }
    Ok(())
}

/// Print the canned project analysis.
pub fn cmd_analyze(ws: &Workspace, project: String) -> Result<()> {
    let project_id = resolve_project_arg(ws, &project)?;
    let name = project_label(ws.store.directory(), project_id);
    let Some(analysis) = analysis::analysis_for_project(project_id, ws.store.now()) else {
        println!("No analysis available for {}.", name);
        return Ok(());
    };

    println!("AI analysis: {}", name);
    println!(
        "Health: {} {}/100 ({})",
        progress_bar(analysis.health_score as u32, 20),
        analysis.health_score,
        if analysis.on_track { "on track" } else { "at risk" }
    );
    println!("\n{}", analysis.summary);
    let lists = [
        ("Risks", &analysis.risks),
        ("Missing steps", &analysis.missing_steps),
        ("Recommendations", &analysis.recommendations),
    ];
    for (title, items) in lists {
        println!("\n{}:", title);
        for item in items {
            println!("  - {}", item);
        }
    }
    if !analysis.overloaded_members.is_empty() {
        println!("\nOverloaded members:");
        for m in &analysis.overloaded_members {
            println!("  - {} ({} tasks): {}", m.user_name, m.task_count, m.reason);
        }
    }
    Ok(())
}

/// Print suggested tasks, optionally adding them to the store.
pub fn cmd_suggest(
    ws: &mut Workspace,
    project: String,
    accept: bool,
    assign: Option<String>,
) -> Result<()> {
    let project_id = resolve_project_arg(ws, &project)?;
    let name = project_label(ws.store.directory(), project_id);
    let suggestions = analysis::suggested_tasks(project_id, &name);

    if !accept {
        println!("Suggested tasks for {}:", name);
        for s in &suggestions {
            let days = s.estimated_days.map(|d| format!(", ~{}d", d)).unwrap_or_default();
            println!("  - {} [{}{}]", s.title, format_priority(s.priority), days);
            println!("      {}", s.description);
            if !s.dependencies.is_empty() {
                println!("      after: {}", s.dependencies.join(", "));
            }
        }
        return Ok(());
    }

    if !ws.session.current_user().role.can_assign() {
        return Err(Error::Other(format!(
            "{}s cannot add tasks; use --role manager",
            format_role(ws.session.current_user().role)
        )));
    }
    let assignee = match assign {
        Some(a) => {
            let id = resolve_user(&a, ws.store.directory().users()).map_err(Error::NotFound)?;
            ws.store
                .directory()
                .user(id)
                .map(|u| Assignee::new(u.id, u.name.clone()))
        }
        None => None,
    };

    let mut added = Vec::new();
    for s in suggestions {
        added.push(ws.store.add_task(s.into_draft(project_id, assignee.clone()))?);
    }
    info!("Accepted {} suggestions for project {}", added.len(), project_id);

    let tasks: Vec<&Task> = added.iter().filter_map(|id| ws.store.task_by_id(*id)).collect();
    println!("Added {} tasks to {}:", tasks.len(), name);
    print_table(&tasks, ws.store.directory(), ws.store.today());
    Ok(())
}

pub fn cmd_users(ws: &Workspace) -> Result<()> {
    let current = ws.session.current_user().id;
    for u in ws.store.directory().users() {
        let marker = if u.id == current { "*" } else { " " };
        println!("{} {:<3} {:<14} {:<8} {}", marker, u.id, u.name, format_role(u.role), u.email);
    }
    Ok(())
}

pub fn cmd_projects(ws: &Workspace) -> Result<()> {
    for p in ws.store.directory().projects() {
        println!(
            "{:<3} {:<24} {:<10} {}",
            p.id,
            p.name,
            format_project_status(p.status),
            p.description.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) -> Result<()> {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    generate(shell, &mut cmd, "td", &mut std::io::stdout());
    Ok(())
}
