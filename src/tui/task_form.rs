//! New-task form for the board.
//!
//! Title, description and due date are typed in place. Project, priority and
//! assignee are selectors cycled with Left/Right.

use chrono::NaiveDate;

use crate::config::parse_date_relative_to;
use crate::display::format_priority;
use crate::fields::{Priority, ProjectId};
use crate::store::Directory;
use crate::task::{Assignee, TaskDraft};
use crate::tui::input::InputField;

/// Field order, top to bottom.
pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const PROJECT_FIELD: usize = 2;
pub const PRIORITY_FIELD: usize = 3;
pub const DUE_FIELD: usize = 4;
pub const ASSIGNEE_FIELD: usize = 5;
pub const FIELD_COUNT: usize = 6;

const PRIORITIES: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

/// Labels are padded to this width when the form is drawn.
pub const LABEL_WIDTH: usize = 13;

pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub project: usize,
    pub priority: usize,
    /// 0 leaves the task in the backlog, `n` picks the n-th team member.
    pub assignee: usize,
    pub current_field: usize,
    projects: Vec<(ProjectId, String)>,
    members: Vec<Assignee>,
}

impl TaskForm {
    /// Empty form over the directory's projects and team members, starting on
    /// `project` when it is one of them.
    pub fn new(directory: &Directory, project: Option<ProjectId>) -> Self {
        let projects: Vec<(ProjectId, String)> = directory
            .projects()
            .iter()
            .map(|p| (p.id, p.name.clone()))
            .collect();
        let project = project
            .and_then(|id| projects.iter().position(|(pid, _)| *pid == id))
            .unwrap_or(0);
        Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            project,
            priority: 1, // Medium
            assignee: 0,
            current_field: TITLE_FIELD,
            projects,
            members: directory
                .members()
                .map(|u| Assignee::new(u.id, u.name.clone()))
                .collect(),
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// The text field being edited, if the cursor is on one.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            DESCRIPTION_FIELD => Some(&mut self.description),
            DUE_FIELD => Some(&mut self.due),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(input) = self.active_input() {
            input.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_delete();
        }
    }

    /// Move the cursor in a text field, or cycle a selector.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            PROJECT_FIELD => self.project = cycle(self.project, self.projects.len(), right),
            PRIORITY_FIELD => self.priority = cycle(self.priority, PRIORITIES.len(), right),
            ASSIGNEE_FIELD => self.assignee = cycle(self.assignee, self.members.len() + 1, right),
            _ => {
                if let Some(input) = self.active_input() {
                    if right {
                        input.move_cursor_right();
                    } else {
                        input.move_cursor_left();
                    }
                }
            }
        }
    }

    pub fn priority_value(&self) -> Priority {
        PRIORITIES.get(self.priority).copied().unwrap_or(Priority::Medium)
    }

    fn assignee_value(&self) -> Option<&Assignee> {
        self.assignee
            .checked_sub(1)
            .and_then(|i| self.members.get(i))
    }

    /// Label and current value of every field, in order.
    pub fn rows(&self) -> [(&'static str, String); FIELD_COUNT] {
        let project = self
            .projects
            .get(self.project)
            .map_or_else(|| "-".to_string(), |(_, name)| name.clone());
        let assignee = self
            .assignee_value()
            .map_or_else(|| "Unassigned".to_string(), |a| a.name.clone());
        [
            ("Title", self.title.value.clone()),
            ("Description", self.description.value.clone()),
            ("Project", format!("< {} >", project)),
            ("Priority", format!("< {} >", format_priority(self.priority_value()))),
            ("Due", self.due.value.clone()),
            ("Assignee", format!("< {} >", assignee)),
        ]
    }

    /// Build the draft the store will validate. Relative due dates count from
    /// `today`. Only problems the store cannot see are reported here.
    pub fn to_draft(&self, today: NaiveDate) -> Result<TaskDraft, String> {
        let Some((project_id, _)) = self.projects.get(self.project) else {
            return Err("No projects to add tasks to".to_string());
        };

        let mut draft = TaskDraft::new(self.title.value.trim(), *project_id)
            .with_priority(self.priority_value());

        let description = self.description.value.trim();
        if !description.is_empty() {
            draft = draft.with_description(description);
        }

        let due = self.due.value.trim();
        if !due.is_empty() {
            let date = parse_date_relative_to(due, today)
                .ok_or_else(|| format!("Unrecognised due date '{}'", due))?;
            draft = draft.with_due_date(date);
        }

        if let Some(assignee) = self.assignee_value() {
            draft = draft.assigned_to(assignee.clone());
        }
        Ok(draft)
    }
}

fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}
