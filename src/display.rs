//! Formatting helpers shared by the CLI and the board.

use chrono::NaiveDate;

use crate::fields::*;
use crate::store::Directory;
use crate::task::Task;

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {}d", delta)
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Pending => "Pending",
        Status::Todo => "To Do",
        Status::InProgress => "In Progress",
        Status::Done => "Done",
        Status::Blocked => "Blocked",
    }
}

pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

pub fn format_role(r: Role) -> &'static str {
    match r {
        Role::Admin => "Admin",
        Role::Manager => "Manager",
        Role::Member => "Member",
    }
}

pub fn format_project_status(s: ProjectStatus) -> &'static str {
    match s {
        ProjectStatus::Active => "Active",
        ProjectStatus::Completed => "Completed",
        ProjectStatus::OnHold => "On Hold",
    }
}

/// Project name for a task, or its raw id when the project is unknown.
pub fn project_label(directory: &Directory, project_id: ProjectId) -> String {
    directory
        .project(project_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("#{}", project_id))
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], directory: &Directory, today: NaiveDate) {
    println!(
        "{:<5} {:<12} {:<7} {:<10} {:<14} {:<16} {}",
        "ID", "Status", "Pri", "Due", "Assignee", "Project", "Title"
    );
    for t in tasks {
        let mut flags = String::new();
        if t.update_requested {
            flags.push_str(" [update requested]");
        }
        if t.ai_generated {
            flags.push_str(" [ai]");
        }
        if !t.comments.is_empty() {
            flags.push_str(&format!(" ({} comments)", t.comments.len()));
        }
        println!(
            "{:<5} {:<12} {:<7} {:<10} {:<14} {:<16} {}{}",
            t.id,
            format_status(t.status()),
            format_priority(t.priority),
            format_due_relative(t.due_date, today),
            truncate(t.assignee_name().unwrap_or("-"), 14),
            truncate(&project_label(directory, t.project_id), 16),
            t.title,
            flags
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Text progress bar, `width` cells wide.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
