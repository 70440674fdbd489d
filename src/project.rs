//! Projects as reference data.
//!
//! Projects are supplied with the seed dataset and never mutated by the store.
//! This module also resolves the project identifiers typed on the command line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{ProjectId, ProjectStatus};

/// A project that tasks belong to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolve a project identifier (either ID or name) to a project ID.
/// Name matching is case-insensitive and also accepts a unique prefix.
pub fn resolve_project(identifier: &str, projects: &[Project]) -> Result<ProjectId, String> {
    let identifier = identifier.trim();
    if let Ok(id) = identifier.parse::<ProjectId>() {
        return if projects.iter().any(|p| p.id == id) {
            Ok(id)
        } else {
            Err(format!("Project with ID {} not found", id))
        };
    }

    let needle = identifier.to_lowercase();
    if let Some(p) = projects.iter().find(|p| p.name.to_lowercase() == needle) {
        return Ok(p.id);
    }

    let matches: Vec<&Project> = projects
        .iter()
        .filter(|p| p.name.to_lowercase().starts_with(&needle))
        .collect();

    match matches.len() {
        0 => Err(format!("No project found with name '{}'", identifier)),
        1 => Ok(matches[0].id),
        _ => {
            let mut error_msg = format!("Multiple projects match '{}':\n", identifier);
            for project in matches {
                error_msg.push_str(&format!("  ID {}: {}\n", project.id, project.name));
            }
            error_msg.push_str("Please use the specific ID instead.");
            Err(error_msg)
        }
    }
}
