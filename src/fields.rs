//! Enumerations and field types for the dashboard.
//!
//! This module defines the small closed sets the rest of the crate switches on:
//! user roles, task statuses and priorities, and project states.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub type TaskId = u64;
pub type ProjectId = u64;
pub type UserId = u64;
pub type CommentId = u64;

/// Dashboard role of a user. Decides which view and which actions apply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Member,
}

impl Role {
    /// Admins and managers hand work out.
    pub fn can_assign(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Admins and managers chase members for updates.
    pub fn can_request_update(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    pub fn can_delete(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Next role in the demo switcher cycle.
    pub fn next(self) -> Role {
        match self {
            Role::Admin => Role::Manager,
            Role::Manager => Role::Member,
            Role::Member => Role::Admin,
        }
    }
}

/// Task status as the views see it.
///
/// `Pending` is the backlog state of a task nobody owns yet; every other value
/// belongs to an assigned task.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Todo,
    #[value(alias = "in_progress")]
    InProgress,
    Done,
    Blocked,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Pending,
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Blocked,
    ];
}

/// Task priority.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Project state. Reference data only; nothing in the store changes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.can_assign());
        assert!(Role::Manager.can_request_update());
        assert!(!Role::Member.can_assign());
        assert!(!Role::Member.can_delete());
    }

    #[test]
    fn test_role_cycle_visits_every_role() {
        let mut role = Role::Admin;
        let mut seen = vec![role];
        for _ in 0..2 {
            role = role.next();
            seen.push(role);
        }
        assert_eq!(seen, vec![Role::Admin, Role::Manager, Role::Member]);
        assert_eq!(role.next(), Role::Admin);
    }

    #[test]
    fn test_status_serialises_snake_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let back: Status = serde_json::from_str("\"blocked\"").unwrap();
        assert_eq!(back, Status::Blocked);
    }
}
