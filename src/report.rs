//! Dashboard reports built from the derived queries.
//!
//! Like the queries, each report is computed from the tasks it is given on
//! every call.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::fields::*;
use crate::queries::completion_rate;
use crate::task::{Comment, Task};
use crate::user::User;

/// Headline numbers for the dashboard overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    pub total: usize,
    pub pending: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub blocked: usize,
    pub overdue: usize,
    pub completion_rate: u32,
    /// Blocked plus overdue: the admin's "needs attention" figure.
    pub needs_attention: usize,
}

impl DashboardMetrics {
    pub fn compute<'a, I>(tasks: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut m = DashboardMetrics::default();
        for task in tasks {
            m.total += 1;
            match task.status() {
                Status::Pending => m.pending += 1,
                Status::Todo => m.todo += 1,
                Status::InProgress => m.in_progress += 1,
                Status::Done => m.completed += 1,
                Status::Blocked => m.blocked += 1,
            }
            if task.is_overdue(today) {
                m.overdue += 1;
            }
        }
        m.completion_rate = completion_rate(m.completed, m.total);
        m.needs_attention = m.blocked + m.overdue;
        m
    }
}

/// Standup summary: what finished in the last day, what is moving, what is stuck.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub user: &'a User,
    pub completed_yesterday: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub blockers: Vec<&'a Task>,
}

impl<'a> DailyReport<'a> {
    /// Build the report over `tasks` (already scoped to what `user` may see).
    /// "Yesterday" is the 24 hours before `now`.
    pub fn compute<I>(tasks: I, user: &'a User, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let since = now - Duration::days(1);
        let mut report = DailyReport {
            generated_at: now,
            user,
            completed_yesterday: Vec::new(),
            in_progress: Vec::new(),
            blockers: Vec::new(),
        };
        for task in tasks {
            if task.completed_at().is_some_and(|at| at >= since && at < now) {
                report.completed_yesterday.push(task);
            }
            match task.status() {
                Status::InProgress => report.in_progress.push(task),
                Status::Blocked => report.blockers.push(task),
                _ => {}
            }
        }
        report
    }
}

/// Task load of one team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWorkload {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub task_count: usize,
    pub completed_count: usize,
    pub open_count: usize,
}

/// Workload for every member-role user, in directory order.
pub fn team_workload(tasks: &[Task], users: &[User]) -> Vec<MemberWorkload> {
    users
        .iter()
        .filter(|u| u.role == Role::Member)
        .map(|u| {
            let mine = tasks.iter().filter(|t| t.assignee_id() == Some(u.id));
            let (task_count, completed_count) = mine.fold((0, 0), |(n, done), t| {
                (n + 1, done + usize::from(t.status() == Status::Done))
            });
            MemberWorkload {
                user_id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                role: u.role,
                task_count,
                completed_count,
                open_count: task_count - completed_count,
            }
        })
        .collect()
}

/// A comment paired with the title of the task it sits on.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectNote<'a> {
    pub task_title: &'a str,
    pub comment: &'a Comment,
}

/// Newest manager comments across a project's tasks, at most `limit`.
pub fn latest_manager_comments(
    tasks: &[Task],
    project_id: ProjectId,
    limit: usize,
) -> Vec<ProjectNote<'_>> {
    let mut notes: Vec<ProjectNote> = tasks
        .iter()
        .filter(|t| t.project_id == project_id)
        .flat_map(|t| {
            t.comments.iter().map(move |c| ProjectNote {
                task_title: &t.title,
                comment: c,
            })
        })
        .filter(|n| n.comment.user_role == Role::Manager)
        .collect();
    notes.sort_by(|a, b| b.comment.created_at.cmp(&a.comment.created_at));
    notes.truncate(limit);
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::visible_to;
    use crate::seed;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 24).unwrap()
    }

    #[test]
    fn test_dashboard_metrics_for_seed() {
        let tasks = seed::tasks();
        let m = DashboardMetrics::compute(&tasks, today());
        assert_eq!(m.total, 12);
        assert_eq!(m.pending, 4);
        assert_eq!(m.todo, 2);
        assert_eq!(m.in_progress, 3);
        assert_eq!(m.completed, 2);
        assert_eq!(m.blocked, 1);
        assert_eq!(m.overdue, 2);
        assert_eq!(m.completion_rate, 17);
        assert_eq!(m.needs_attention, 3);
    }

    #[test]
    fn test_dashboard_metrics_empty() {
        let m = DashboardMetrics::compute(std::iter::empty::<&Task>(), today());
        assert_eq!(m, DashboardMetrics::default());
    }

    #[test]
    fn test_daily_report_windows_completion() {
        let tasks = seed::tasks();
        let users = seed::users();
        let jane = &users[3];
        // Task 7 was completed at midnight on the 14th.
        let now = Utc.with_ymd_and_hms(2025, 1, 14, 8, 0, 0).unwrap();
        let report = DailyReport::compute(visible_to(&tasks, jane), jane, now);
        let done: Vec<TaskId> = report.completed_yesterday.iter().map(|t| t.id).collect();
        assert_eq!(done, vec![7]);
        let moving: Vec<TaskId> = report.in_progress.iter().map(|t| t.id).collect();
        assert_eq!(moving, vec![5]);
        let stuck: Vec<TaskId> = report.blockers.iter().map(|t| t.id).collect();
        assert_eq!(stuck, vec![3]);

        let later = Utc.with_ymd_and_hms(2025, 1, 16, 8, 0, 0).unwrap();
        let report = DailyReport::compute(visible_to(&tasks, jane), jane, later);
        assert!(report.completed_yesterday.is_empty());
    }

    #[test]
    fn test_team_workload_counts_members_only() {
        let tasks = seed::tasks();
        let load = team_workload(&tasks, &seed::users());
        assert_eq!(load.len(), 2);
        assert_eq!(load[0].name, "John Doe");
        assert_eq!(load[0].task_count, 5);
        assert_eq!(load[0].completed_count, 1);
        assert_eq!(load[0].open_count, 4);
        assert_eq!(load[1].name, "Jane Smith");
        assert_eq!(load[1].task_count, 3);
        assert_eq!(load[1].completed_count, 1);
    }

    #[test]
    fn test_latest_manager_comments_newest_first() {
        let tasks = seed::tasks();
        let notes = latest_manager_comments(&tasks, 1, 3);
        let titles: Vec<&str> = notes.iter().map(|n| n.task_title).collect();
        assert_eq!(
            titles,
            vec!["Implement responsive navigation", "Setup CI/CD pipeline"]
        );
        assert_eq!(latest_manager_comments(&tasks, 1, 1).len(), 1);
        assert_eq!(latest_manager_comments(&tasks, 2, 3).len(), 1);
    }
}
