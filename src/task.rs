//! Task data structures.
//!
//! A task's status and assignee are held together in a [`Lifecycle`]: a task
//! either sits unassigned in the backlog, or it belongs to someone and is at
//! one of the working stages. The completion timestamp lives inside the `Done`
//! stage, so "completed_at is set iff the task is done" holds by construction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// The user a task is assigned to, denormalised for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignee {
    pub id: UserId,
    pub name: String,
}

impl Assignee {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Working stage of an assigned task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Stage {
    Todo,
    InProgress,
    Done { completed_at: DateTime<Utc> },
    Blocked,
}

impl Stage {
    /// Stage for a target status, stamping completion with `now`.
    /// `Pending` has no stage: it is the unassigned state.
    pub fn for_status(status: Status, now: DateTime<Utc>) -> Option<Stage> {
        match status {
            Status::Pending => None,
            Status::Todo => Some(Stage::Todo),
            Status::InProgress => Some(Stage::InProgress),
            Status::Done => Some(Stage::Done { completed_at: now }),
            Status::Blocked => Some(Stage::Blocked),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Stage::Todo => Status::Todo,
            Stage::InProgress => Status::InProgress,
            Stage::Done { .. } => Status::Done,
            Stage::Blocked => Status::Blocked,
        }
    }
}

/// Who owns a task and how far along it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    Unassigned,
    Assigned { assignee: Assignee, stage: Stage },
}

impl Lifecycle {
    pub fn status(&self) -> Status {
        match self {
            Lifecycle::Unassigned => Status::Pending,
            Lifecycle::Assigned { stage, .. } => stage.status(),
        }
    }

    pub fn assignee(&self) -> Option<&Assignee> {
        match self {
            Lifecycle::Unassigned => None,
            Lifecycle::Assigned { assignee, .. } => Some(assignee),
        }
    }
}

/// A note left on a task. Comments are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_role: Role,
    pub content: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A unit of work tracked through its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub lifecycle: Lifecycle,
    pub project_id: ProjectId,
    pub due_date: Option<NaiveDate>,
    pub blocker_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub update_requested: bool,
    #[serde(default)]
    pub ai_generated: bool,
}

impl Task {
    pub fn status(&self) -> Status {
        self.lifecycle.status()
    }

    pub fn assignee_id(&self) -> Option<UserId> {
        self.lifecycle.assignee().map(|a| a.id)
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.lifecycle.assignee().map(|a| a.name.as_str())
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match &self.lifecycle {
            Lifecycle::Assigned {
                stage: Stage::Done { completed_at },
                ..
            } => Some(*completed_at),
            _ => None,
        }
    }

    /// Due before `today` and not yet done.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status() != Status::Done && self.due_date.is_some_and(|d| d < today)
    }
}

/// Fields supplied by the caller when creating a task. Identity and
/// timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub project_id: ProjectId,
    pub assignee: Option<Assignee>,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub blocker_reason: Option<String>,
    pub ai_generated: bool,
}

impl TaskDraft {
    /// A medium-priority backlog draft.
    pub fn new(title: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            project_id,
            assignee: None,
            status: Status::Pending,
            due_date: None,
            blocker_reason: None,
            ai_generated: false,
        }
    }

    /// Assign the draft; a pending draft moves to `Todo`.
    pub fn assigned_to(mut self, assignee: Assignee) -> Self {
        self.assignee = Some(assignee);
        if self.status == Status::Pending {
            self.status = Status::Todo;
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }
}

/// Partial update merged into an existing task by `TaskStore::update_task`.
///
/// Clearable fields use a nested `Option`: `Some(None)` clears the value,
/// `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub due_date: Option<Option<NaiveDate>>,
    pub blocker_reason: Option<Option<String>>,
    pub ai_generated: Option<bool>,
}

/// Fields supplied by the caller when commenting on a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentDraft {
    pub user_id: UserId,
    pub user_name: String,
    pub user_role: Role,
    pub content: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
}

impl CommentDraft {
    pub fn new(
        user_id: UserId,
        user_name: impl Into<String>,
        user_role: Role,
        content: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            user_role,
            content: content.into(),
            link: None,
            image_url: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}
