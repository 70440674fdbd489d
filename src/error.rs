//! Error types for taskdeck.

use thiserror::Error;

use crate::fields::{ProjectId, Status, TaskId, UserId};

/// Rejections raised at the store boundary. Missing tasks are never errors;
/// mutations report them through their return value instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("project {0} does not exist")]
    UnknownProject(ProjectId),

    #[error("user {0} does not exist")]
    UnknownAssignee(UserId),

    #[error("comment cannot be empty")]
    EmptyComment,

    #[error("task {0} has no assignee; assign it before changing its status")]
    Unassigned(TaskId),

    #[error("a task without an assignee must be pending, not {0:?}")]
    StatusNeedsAssignee(Status),

    #[error("an assigned task cannot start out pending")]
    AssignedPending,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
