//! Derived views over a task snapshot.
//!
//! Everything here is a pure linear scan over `&[Task]`: results keep the
//! snapshot's order and nothing is cached, so each call reflects the
//! collection it is handed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::fields::*;
use crate::task::Task;
use crate::user::User;

pub fn tasks_by_status(tasks: &[Task], status: Status) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status() == status).collect()
}

pub fn task_by_id(tasks: &[Task], id: TaskId) -> Option<&Task> {
    tasks.iter().find(|t| t.id == id)
}

pub fn tasks_by_assignee(tasks: &[Task], assignee_id: UserId) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.assignee_id() == Some(assignee_id))
        .collect()
}

pub fn tasks_by_project(tasks: &[Task], project_id: ProjectId) -> Vec<&Task> {
    tasks.iter().filter(|t| t.project_id == project_id).collect()
}

/// Tasks due before `today` that are not done, in collection order.
pub fn overdue_tasks(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_overdue(today)).collect()
}

/// Role-scoped view: members see the work assigned to them, managers and
/// admins see every task.
pub fn visible_to<'a>(tasks: &'a [Task], user: &User) -> Vec<&'a Task> {
    match user.role {
        Role::Member => tasks_by_assignee(tasks, user.id),
        Role::Manager | Role::Admin => tasks.iter().collect(),
    }
}

/// Kanban columns: every status is present, empty or not.
pub fn group_by_status<'a, I>(tasks: I) -> BTreeMap<Status, Vec<&'a Task>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut columns: BTreeMap<Status, Vec<&Task>> =
        Status::ALL.iter().map(|s| (*s, Vec::new())).collect();
    for task in tasks {
        columns.entry(task.status()).or_default().push(task);
    }
    columns
}

/// `round(completed / total * 100)`, or 0 for an empty set.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // Half-up rounding in integers.
    ((completed * 200 + total) / (total * 2)) as u32
}

/// Per-project aggregate, recomputed on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub project_id: ProjectId,
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub todo: usize,
    pub pending: usize,
    pub completion_rate: u32,
}

pub fn project_stats(tasks: &[Task], project_id: ProjectId) -> ProjectStats {
    let mut stats = ProjectStats {
        project_id,
        ..ProjectStats::default()
    };
    for task in tasks_by_project(tasks, project_id) {
        stats.total += 1;
        match task.status() {
            Status::Done => stats.completed += 1,
            Status::InProgress => stats.in_progress += 1,
            Status::Blocked => stats.blocked += 1,
            Status::Todo => stats.todo += 1,
            Status::Pending => stats.pending += 1,
        }
    }
    stats.completion_rate = completion_rate(stats.completed, stats.total);
    stats
}
