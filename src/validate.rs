//! Input checks applied at the store boundary.

use crate::error::StoreError;
use crate::fields::{Status, UserId};
use crate::store::Directory;
use crate::task::{CommentDraft, TaskDraft, TaskPatch};

pub fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_assignee(id: UserId, directory: &Directory) -> Result<(), StoreError> {
    if directory.user(id).is_none() {
        return Err(StoreError::UnknownAssignee(id));
    }
    Ok(())
}

/// Check a draft before the store turns it into a task.
pub fn validate_draft(draft: &TaskDraft, directory: &Directory) -> Result<(), StoreError> {
    validate_title(&draft.title)?;
    if directory.project(draft.project_id).is_none() {
        return Err(StoreError::UnknownProject(draft.project_id));
    }
    match &draft.assignee {
        Some(assignee) => {
            validate_assignee(assignee.id, directory)?;
            if draft.status == Status::Pending {
                return Err(StoreError::AssignedPending);
            }
        }
        None if draft.status != Status::Pending => {
            return Err(StoreError::StatusNeedsAssignee(draft.status));
        }
        None => {}
    }
    Ok(())
}

pub fn validate_patch(patch: &TaskPatch) -> Result<(), StoreError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    Ok(())
}

pub fn validate_comment(draft: &CommentDraft) -> Result<(), StoreError> {
    if draft.content.trim().is_empty() {
        return Err(StoreError::EmptyComment);
    }
    Ok(())
}
