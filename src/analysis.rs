//! Canned "AI" project analysis and task suggestions.
//!
//! There is no model behind this: analyses and suggestions are fixed per
//! project, with a generic fallback for projects the table does not know.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fields::*;
use crate::task::{Assignee, TaskDraft};

/// A member flagged as carrying too much work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverloadedMember {
    pub user_id: UserId,
    pub user_name: String,
    pub task_count: usize,
    pub reason: String,
}

/// Health report for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAnalysis {
    pub project_id: ProjectId,
    pub summary: String,
    /// 0-100.
    pub health_score: u8,
    pub on_track: bool,
    pub risks: Vec<String>,
    pub missing_steps: Vec<String>,
    pub overloaded_members: Vec<OverloadedMember>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// A task the analysis proposes adding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimated_days: Option<u32>,
    pub dependencies: Vec<String>,
}

impl SuggestedTask {
    /// Turn the suggestion into an AI-flagged draft: pending when nobody takes
    /// it, `Todo` when it goes straight to someone.
    pub fn into_draft(self, project_id: ProjectId, assignee: Option<Assignee>) -> TaskDraft {
        let mut draft = TaskDraft::new(self.title, project_id)
            .with_description(self.description)
            .with_priority(self.priority);
        draft.ai_generated = true;
        match assignee {
            Some(a) => draft.assigned_to(a),
            None => draft,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn suggestion(title: &str, description: &str, priority: Priority, days: u32) -> SuggestedTask {
    SuggestedTask {
        title: title.to_string(),
        description: description.to_string(),
        priority,
        estimated_days: Some(days),
        dependencies: Vec::new(),
    }
}

/// Canned analysis for a project, stamped with `now`.
pub fn analysis_for_project(project_id: ProjectId, now: DateTime<Utc>) -> Option<ProjectAnalysis> {
    match project_id {
        1 => Some(ProjectAnalysis {
            project_id,
            summary: "Website Redesign project is progressing well with 62% completion. The team \
                      is slightly behind schedule due to CI/CD pipeline blocker. Jane Smith is \
                      handling multiple critical tasks."
                .to_string(),
            health_score: 75,
            on_track: true,
            risks: strings(&[
                "CI/CD pipeline blocked - waiting for DevOps resources",
                "Performance optimization task may extend timeline",
            ]),
            missing_steps: strings(&[
                "Security audit not yet scheduled",
                "Cross-browser testing plan needed",
                "SEO optimization tasks missing",
            ]),
            overloaded_members: vec![OverloadedMember {
                user_id: 4,
                user_name: "Jane Smith".to_string(),
                task_count: 3,
                reason: "Handling blocked CI/CD task plus ongoing app icon design".to_string(),
            }],
            recommendations: strings(&[
                "Escalate CI/CD blocker to unblock Jane Smith",
                "Add security audit task before deployment",
                "Consider assigning cross-browser testing to another team member",
                "Schedule SEO review meeting with marketing team",
            ]),
            generated_at: now,
        }),
        2 => Some(ProjectAnalysis {
            project_id,
            summary: "Mobile App Development is in early stages with good momentum. Team has \
                      clear priorities but needs more task breakdown for implementation phase."
                .to_string(),
            health_score: 68,
            on_track: true,
            risks: strings(&[
                "API documentation delayed - may impact development",
                "App icon design is low priority but needed for App Store submission",
            ]),
            missing_steps: strings(&[
                "Backend API development tasks not defined",
                "User authentication flow tasks missing",
                "App Store submission checklist needed",
                "Beta testing plan not created",
            ]),
            overloaded_members: Vec::new(),
            recommendations: strings(&[
                "Break down API documentation into smaller tasks",
                "Add backend development tasks for authentication",
                "Create App Store submission timeline",
                "Schedule beta testing with target users",
                "Consider upgrading app icon design priority for timely submission",
            ]),
            generated_at: now,
        }),
        _ => None,
    }
}

/// Suggested tasks for a project; unknown projects get generic planning work.
pub fn suggested_tasks(project_id: ProjectId, project_name: &str) -> Vec<SuggestedTask> {
    match project_id {
        1 => vec![
            suggestion(
                "Conduct security audit",
                "Perform comprehensive security review of new website code and infrastructure",
                Priority::High,
                3,
            ),
            suggestion(
                "Create cross-browser testing plan",
                "Define testing matrix for Chrome, Firefox, Safari, Edge across desktop and mobile",
                Priority::Medium,
                1,
            ),
            suggestion(
                "SEO optimization review",
                "Review meta tags, structured data, sitemap, and page speed optimizations",
                Priority::Medium,
                2,
            ),
            suggestion(
                "Setup monitoring and analytics",
                "Configure Google Analytics, error tracking, and performance monitoring",
                Priority::Low,
                1,
            ),
        ],
        2 => {
            let mut backend = suggestion(
                "Implement backend API for authentication",
                "Build REST API endpoints for user registration, login, token refresh",
                Priority::High,
                5,
            );
            backend.dependencies = strings(&["Design user authentication flow"]);
            vec![
                suggestion(
                    "Design user authentication flow",
                    "Create wireframes and user flows for login, signup, password reset",
                    Priority::High,
                    2,
                ),
                backend,
                suggestion(
                    "Setup push notifications infrastructure",
                    "Configure FCM for Android and APNs for iOS push notifications",
                    Priority::Medium,
                    3,
                ),
                suggestion(
                    "Create beta testing checklist",
                    "Define TestFlight setup, beta tester recruitment, and feedback collection process",
                    Priority::Medium,
                    1,
                ),
                suggestion(
                    "App Store submission preparation",
                    "Gather screenshots, app description, privacy policy, and submission requirements",
                    Priority::Low,
                    2,
                ),
            ]
        }
        _ => vec![
            suggestion(
                &format!("Define {} milestones", project_name),
                "Break down project into major milestones with timelines",
                Priority::High,
                1,
            ),
            suggestion(
                &format!("Create {} technical documentation", project_name),
                "Document architecture, APIs, and development guidelines",
                Priority::Medium,
                3,
            ),
        ],
    }
}
