//! Fixed reference dataset the dashboard starts from.
//!
//! Four users (one admin, one manager, two members), two projects and a dozen
//! tasks covering every status, including AI-suggested backlog items.

use chrono::{DateTime, NaiveDate, Utc};

use crate::fields::*;
use crate::project::Project;
use crate::store::Directory;
use crate::task::{Assignee, Comment, Lifecycle, Stage, Task};
use crate::user::User;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap_or_default()
}

fn at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    date(month, day)
        .and_hms_opt(hour, minute, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

fn day(month: u32, d: u32) -> DateTime<Utc> {
    at(month, d, 0, 0)
}

fn user(id: UserId, email: &str, name: &str, role: Role) -> User {
    User {
        id,
        email: email.to_string(),
        name: name.to_string(),
        role,
        created_at: day(1, 1),
    }
}

pub fn users() -> Vec<User> {
    vec![
        user(1, "admin@company.com", "Admin User", Role::Admin),
        user(2, "manager@company.com", "Manager User", Role::Manager),
        user(3, "john@company.com", "John Doe", Role::Member),
        user(4, "jane@company.com", "Jane Smith", Role::Member),
    ]
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: 1,
            name: "Website Redesign".to_string(),
            description: Some("Redesign company website".to_string()),
            status: ProjectStatus::Active,
            created_at: day(1, 1),
            updated_at: day(1, 15),
        },
        Project {
            id: 2,
            name: "Mobile App Development".to_string(),
            description: Some("Build mobile app for iOS and Android".to_string()),
            status: ProjectStatus::Active,
            created_at: day(1, 5),
            updated_at: day(1, 20),
        },
    ]
}

pub fn directory() -> Directory {
    Directory::new(users(), projects())
}

struct Seed {
    id: TaskId,
    title: &'static str,
    description: &'static str,
    priority: Priority,
    lifecycle: Lifecycle,
    project_id: ProjectId,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Seed {
    fn build(self) -> Task {
        Task {
            id: self.id,
            title: self.title.to_string(),
            description: Some(self.description.to_string()),
            priority: self.priority,
            lifecycle: self.lifecycle,
            project_id: self.project_id,
            due_date: self.due_date,
            blocker_reason: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
            comments: Vec::new(),
            update_requested: false,
            ai_generated: false,
        }
    }
}

fn john(stage: Stage) -> Lifecycle {
    Lifecycle::Assigned {
        assignee: Assignee::new(3, "John Doe"),
        stage,
    }
}

fn jane(stage: Stage) -> Lifecycle {
    Lifecycle::Assigned {
        assignee: Assignee::new(4, "Jane Smith"),
        stage,
    }
}

fn manager_comment(
    id: CommentId,
    task_id: TaskId,
    content: &str,
    link: Option<&str>,
    created_at: DateTime<Utc>,
) -> Comment {
    Comment {
        id,
        task_id,
        user_id: 2,
        user_name: "Manager User".to_string(),
        user_role: Role::Manager,
        content: content.to_string(),
        link: link.map(str::to_string),
        image_url: None,
        created_at,
    }
}

fn backlog(
    id: TaskId,
    title: &'static str,
    description: &'static str,
    priority: Priority,
    project_id: ProjectId,
    created_at: DateTime<Utc>,
) -> Task {
    let mut task = Seed {
        id,
        title,
        description,
        priority,
        lifecycle: Lifecycle::Unassigned,
        project_id,
        due_date: None,
        created_at,
        updated_at: created_at,
    }
    .build();
    task.ai_generated = true;
    task
}

pub fn tasks() -> Vec<Task> {
    let mut tasks = vec![
        Seed {
            id: 1,
            title: "Design homepage mockup",
            description: "Create high-fidelity mockup for new homepage",
            priority: Priority::High,
            lifecycle: john(Stage::Done { completed_at: day(1, 10) }),
            project_id: 1,
            due_date: Some(date(1, 10)),
            created_at: day(1, 1),
            updated_at: day(1, 10),
        }
        .build(),
        Seed {
            id: 2,
            title: "Implement responsive navigation",
            description: "Build mobile-responsive navigation component",
            priority: Priority::High,
            lifecycle: john(Stage::InProgress),
            project_id: 1,
            due_date: Some(date(1, 25)),
            created_at: day(1, 11),
            updated_at: day(1, 20),
        }
        .build(),
        Seed {
            id: 3,
            title: "Setup CI/CD pipeline",
            description: "Configure automated deployment",
            priority: Priority::Medium,
            lifecycle: jane(Stage::Blocked),
            project_id: 1,
            due_date: Some(date(1, 22)),
            created_at: day(1, 12),
            updated_at: day(1, 18),
        }
        .build(),
        Seed {
            id: 4,
            title: "Write API documentation",
            description: "Document all API endpoints",
            priority: Priority::Medium,
            lifecycle: john(Stage::Todo),
            project_id: 2,
            due_date: Some(date(1, 30)),
            created_at: day(1, 15),
            updated_at: day(1, 15),
        }
        .build(),
        Seed {
            id: 5,
            title: "Design app icon",
            description: "Create app icons for iOS and Android",
            priority: Priority::Low,
            lifecycle: jane(Stage::InProgress),
            project_id: 2,
            due_date: Some(date(1, 28)),
            created_at: day(1, 16),
            updated_at: day(1, 21),
        }
        .build(),
        Seed {
            id: 6,
            title: "Fix authentication bug",
            description: "Users unable to login with SSO",
            priority: Priority::High,
            lifecycle: john(Stage::Todo),
            project_id: 2,
            due_date: Some(date(1, 20)),
            created_at: day(1, 18),
            updated_at: day(1, 18),
        }
        .build(),
        Seed {
            id: 7,
            title: "Update dependencies",
            description: "Update all npm packages to latest versions",
            priority: Priority::Low,
            lifecycle: jane(Stage::Done { completed_at: day(1, 14) }),
            project_id: 1,
            due_date: Some(date(1, 15)),
            created_at: day(1, 10),
            updated_at: day(1, 14),
        }
        .build(),
        Seed {
            id: 8,
            title: "Performance optimization",
            description: "Optimize page load time",
            priority: Priority::Medium,
            lifecycle: john(Stage::InProgress),
            project_id: 1,
            due_date: Some(date(1, 27)),
            created_at: day(1, 17),
            updated_at: day(1, 22),
        }
        .build(),
        backlog(
            9,
            "Security audit",
            "Perform comprehensive security review of new website code and infrastructure",
            Priority::High,
            1,
            day(1, 22),
        ),
        backlog(
            10,
            "Cross-browser testing",
            "Test website across Chrome, Firefox, Safari, and Edge",
            Priority::Medium,
            1,
            day(1, 22),
        ),
        backlog(
            11,
            "SEO optimization",
            "Review meta tags, structured data, sitemap, and page speed optimizations",
            Priority::Medium,
            1,
            day(1, 22),
        ),
        backlog(
            12,
            "User authentication flow design",
            "Create wireframes and user flows for login, signup, password reset",
            Priority::High,
            2,
            day(1, 23),
        ),
    ];

    tasks[1].comments.push(manager_comment(
        1,
        2,
        "Great progress! Make sure to test on mobile devices before wrapping up.",
        None,
        at(1, 20, 10, 30),
    ));
    tasks[2].blocker_reason = Some("Waiting for DevOps team to provision server".to_string());
    tasks[2].comments.push(manager_comment(
        2,
        3,
        "I've escalated this to the DevOps lead. Should get resources by tomorrow.",
        Some("https://devops.slack.com/archives/C01234567"),
        at(1, 18, 14, 15),
    ));
    tasks[4].comments.push(manager_comment(
        3,
        5,
        "Looking good! Please follow the brand guidelines from the design system.",
        Some("https://figma.com/design-system"),
        at(1, 21, 9, 0),
    ));
    tasks[7].update_requested = true;

    tasks
}
