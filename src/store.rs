//! The task store: sole owner of the task collection.
//!
//! The collection is held as a copy-on-write [`Snapshot`]. Every mutation that
//! changes something produces a new snapshot and hands it to the registered
//! subscribers; a reader that kept an older snapshot keeps seeing the old
//! state. Lookups that miss are not errors: mutations report them as `false`
//! (or `None`) and leave the store untouched. Malformed input is rejected with
//! a [`StoreError`] before anything changes.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::StoreError;
use crate::fields::*;
use crate::project::Project;
use crate::queries::{self, ProjectStats};
use crate::task::{Assignee, Comment, CommentDraft, Lifecycle, Stage, Task, TaskDraft, TaskPatch};
use crate::user::User;
use crate::validate;

/// Immutable view of the task collection at one point in time.
pub type Snapshot = Arc<Vec<Task>>;

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&Snapshot)>;

/// Users and projects the store validates against. Read-only.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: Vec<User>,
    projects: Vec<Project>,
}

impl Directory {
    pub fn new(users: Vec<User>, projects: Vec<Project>) -> Self {
        Self { users, projects }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Users with the member role, in directory order.
    pub fn members(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter(|u| u.role == Role::Member)
    }
}

/// In-memory task collection plus its mutation API.
pub struct TaskStore {
    tasks: Snapshot,
    directory: Directory,
    clock: Box<dyn Clock>,
    next_task_id: TaskId,
    next_comment_id: CommentId,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl TaskStore {
    /// Build a store over an initial collection. Identifiers handed out later
    /// continue after the highest ones present.
    pub fn new(directory: Directory, tasks: Vec<Task>, clock: Box<dyn Clock>) -> Self {
        let next_task_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let next_comment_id = tasks
            .iter()
            .flat_map(|t| t.comments.iter().map(|c| c.id))
            .max()
            .unwrap_or(0)
            + 1;
        TaskStore {
            tasks: Arc::new(tasks),
            directory,
            clock,
            next_task_id,
            next_comment_id,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Current snapshot. Cheap: shares the collection.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.tasks)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Register an observer that receives every published snapshot.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn publish(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.tasks);
        }
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn task_mut(&mut self, idx: usize) -> &mut Task {
        &mut Arc::make_mut(&mut self.tasks)[idx]
    }

    /// Timestamp for a mutation: the clock's reading, nudged forward when the
    /// clock has not moved past `previous`.
    fn stamp(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.now();
        if now > previous {
            now
        } else {
            previous + Duration::microseconds(1)
        }
    }

    /// Append a new task built from `draft`.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<TaskId, StoreError> {
        if let Err(e) = validate::validate_draft(&draft, &self.directory) {
            warn!("Rejected task draft '{}': {}", draft.title, e);
            return Err(e);
        }

        let now = self.clock.now();
        let id = self.next_task_id;
        self.next_task_id += 1;

        let lifecycle = match (draft.assignee, Stage::for_status(draft.status, now)) {
            (Some(assignee), Some(stage)) => Lifecycle::Assigned { assignee, stage },
            _ => Lifecycle::Unassigned,
        };

        let task = Task {
            id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            lifecycle,
            project_id: draft.project_id,
            due_date: draft.due_date,
            blocker_reason: draft.blocker_reason,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            update_requested: false,
            ai_generated: draft.ai_generated,
        };
        Arc::make_mut(&mut self.tasks).push(task);
        debug!(task_id = id, "Added task");
        self.publish();
        Ok(id)
    }

    /// Merge `patch` into a task. Returns `Ok(false)` when the task is missing.
    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> Result<bool, StoreError> {
        validate::validate_patch(&patch)?;
        let Some(idx) = self.position(id) else {
            debug!(task_id = id, "Update ignored, task not found");
            return Ok(false);
        };

        let now = self.stamp(self.tasks[idx].updated_at);
        let lifecycle = match patch.status {
            Some(status) => match transition(&self.tasks[idx], status, now) {
                Ok(lifecycle) => Some(lifecycle),
                Err(e) => {
                    warn!("Rejected update on task {}: {}", id, e);
                    return Err(e);
                }
            },
            None => None,
        };

        let task = self.task_mut(idx);
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(reason) = patch.blocker_reason {
            task.blocker_reason = reason;
        }
        if let Some(ai_generated) = patch.ai_generated {
            task.ai_generated = ai_generated;
        }
        if let Some(lifecycle) = lifecycle {
            task.lifecycle = lifecycle;
        }
        task.updated_at = now;
        debug!(task_id = id, "Updated task");
        self.publish();
        Ok(true)
    }

    /// Remove a task for good. Returns whether anything was removed.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let Some(idx) = self.position(id) else {
            debug!(task_id = id, "Delete ignored, task not found");
            return false;
        };
        Arc::make_mut(&mut self.tasks).remove(idx);
        debug!(task_id = id, "Deleted task");
        self.publish();
        true
    }

    /// Move a task to `status`.
    ///
    /// Entering `Done` stamps the completion time and leaving it clears it.
    /// The update-request flag is cleared only when the status really changes.
    /// The blocker reason is not touched.
    pub fn update_task_status(&mut self, id: TaskId, status: Status) -> Result<bool, StoreError> {
        let Some(idx) = self.position(id) else {
            debug!(task_id = id, "Status change ignored, task not found");
            return Ok(false);
        };

        let now = self.stamp(self.tasks[idx].updated_at);
        let previous = self.tasks[idx].status();
        let lifecycle = match transition(&self.tasks[idx], status, now) {
            Ok(lifecycle) => lifecycle,
            Err(e) => {
                warn!("Rejected status change on task {}: {}", id, e);
                return Err(e);
            }
        };

        let task = self.task_mut(idx);
        task.lifecycle = lifecycle;
        task.updated_at = now;
        if previous != status {
            task.update_requested = false;
        }
        debug!(task_id = id, from = ?previous, to = ?status, "Changed task status");
        self.publish();
        Ok(true)
    }

    /// Hand a task to a user. The task always lands in `Todo`, whatever it was.
    pub fn assign_task(
        &mut self,
        id: TaskId,
        assignee_id: UserId,
        assignee_name: &str,
    ) -> Result<bool, StoreError> {
        validate::validate_assignee(assignee_id, &self.directory)?;
        let Some(idx) = self.position(id) else {
            debug!(task_id = id, "Assignment ignored, task not found");
            return Ok(false);
        };

        let now = self.stamp(self.tasks[idx].updated_at);
        let task = self.task_mut(idx);
        task.lifecycle = Lifecycle::Assigned {
            assignee: Assignee::new(assignee_id, assignee_name),
            stage: Stage::Todo,
        };
        task.updated_at = now;
        debug!(task_id = id, assignee_id, "Assigned task");
        self.publish();
        Ok(true)
    }

    /// Append a comment. Returns the new comment's id, or `None` when the task
    /// is missing.
    pub fn add_comment(
        &mut self,
        task_id: TaskId,
        draft: CommentDraft,
    ) -> Result<Option<CommentId>, StoreError> {
        validate::validate_comment(&draft)?;
        let Some(idx) = self.position(task_id) else {
            debug!(task_id, "Comment ignored, task not found");
            return Ok(None);
        };

        let now = self.stamp(self.tasks[idx].updated_at);
        let id = self.next_comment_id;
        self.next_comment_id += 1;
        let task = self.task_mut(idx);
        task.comments.push(Comment {
            id,
            task_id,
            user_id: draft.user_id,
            user_name: draft.user_name,
            user_role: draft.user_role,
            content: draft.content,
            link: draft.link,
            image_url: draft.image_url,
            created_at: now,
        });
        task.updated_at = now;
        debug!(task_id, comment_id = id, "Added comment");
        self.publish();
        Ok(Some(id))
    }

    /// Flag a task as awaiting an update from its assignee.
    pub fn request_update(&mut self, id: TaskId) -> bool {
        self.set_update_requested(id, true)
    }

    pub fn clear_update_request(&mut self, id: TaskId) -> bool {
        self.set_update_requested(id, false)
    }

    fn set_update_requested(&mut self, id: TaskId, requested: bool) -> bool {
        let Some(idx) = self.position(id) else {
            debug!(task_id = id, "Update request ignored, task not found");
            return false;
        };
        if self.tasks[idx].update_requested == requested {
            return true;
        }
        self.task_mut(idx).update_requested = requested;
        debug!(task_id = id, requested, "Set update request flag");
        self.publish();
        true
    }

    pub fn task_by_id(&self, id: TaskId) -> Option<&Task> {
        queries::task_by_id(&self.tasks, id)
    }

    pub fn tasks_by_status(&self, status: Status) -> Vec<&Task> {
        queries::tasks_by_status(&self.tasks, status)
    }

    pub fn tasks_by_assignee(&self, assignee_id: UserId) -> Vec<&Task> {
        queries::tasks_by_assignee(&self.tasks, assignee_id)
    }

    pub fn tasks_by_project(&self, project_id: ProjectId) -> Vec<&Task> {
        queries::tasks_by_project(&self.tasks, project_id)
    }

    /// Overdue relative to the store clock.
    pub fn overdue_tasks(&self) -> Vec<&Task> {
        queries::overdue_tasks(&self.tasks, self.today())
    }

    pub fn project_stats(&self, project_id: ProjectId) -> ProjectStats {
        queries::project_stats(&self.tasks, project_id)
    }

    pub fn visible_to(&self, user: &User) -> Vec<&Task> {
        queries::visible_to(&self.tasks, user)
    }
}

/// Lifecycle a task ends up in when moved to `status` at `now`.
///
/// `Pending` sends an assigned task back to the unassigned backlog. Any other
/// status needs an assignee to carry it.
fn transition(task: &Task, status: Status, now: DateTime<Utc>) -> Result<Lifecycle, StoreError> {
    match (&task.lifecycle, Stage::for_status(status, now)) {
        (_, None) => Ok(Lifecycle::Unassigned),
        (Lifecycle::Unassigned, Some(_)) => Err(StoreError::Unassigned(task.id)),
        (Lifecycle::Assigned { assignee, .. }, Some(stage)) => Ok(Lifecycle::Assigned {
            assignee: assignee.clone(),
            stage,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::seed;
    use chrono::TimeZone;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn clock() -> Rc<ManualClock> {
        Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 24, 9, 0, 0).unwrap(),
        ))
    }

    fn seeded_with(clock: &Rc<ManualClock>) -> TaskStore {
        TaskStore::new(seed::directory(), seed::tasks(), Box::new(Rc::clone(clock)))
    }

    fn seeded() -> TaskStore {
        seeded_with(&clock())
    }

    fn assert_lifecycle_invariants(store: &TaskStore) {
        for task in store.tasks() {
            assert_eq!(task.status() == Status::Done, task.completed_at().is_some());
            assert_eq!(task.assignee_id().is_none(), task.status() == Status::Pending);
            assert!(task.updated_at >= task.created_at);
        }
    }

    #[test]
    fn test_add_task_round_trip() {
        let mut store = seeded();
        let due = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let draft = TaskDraft::new("Load testing", 2)
            .with_description("Simulate 10k concurrent users")
            .with_priority(Priority::High)
            .with_due_date(due)
            .assigned_to(Assignee::new(4, "Jane Smith"));

        let id = store.add_task(draft).unwrap();
        assert_eq!(id, 13);
        let task = store.task_by_id(id).unwrap();
        assert_eq!(task.title, "Load testing");
        assert_eq!(task.description.as_deref(), Some("Simulate 10k concurrent users"));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.project_id, 2);
        assert_eq!(task.due_date, Some(due));
        assert_eq!(task.status(), Status::Todo);
        assert_eq!(task.assignee_name(), Some("Jane Smith"));
        assert_eq!(task.created_at, store.now());
        assert_eq!(task.updated_at, task.created_at);
        assert!(task.comments.is_empty());
        assert_eq!(store.tasks().last().map(|t| t.id), Some(id));
    }

    #[test]
    fn test_add_task_rejects_invalid_draft() {
        let mut store = seeded();
        let before = store.snapshot();
        assert_eq!(store.add_task(TaskDraft::new("", 1)), Err(StoreError::EmptyTitle));
        assert_eq!(
            store.add_task(TaskDraft::new("Orphan", 9)),
            Err(StoreError::UnknownProject(9))
        );
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_add_done_task_is_stamped_complete() {
        let mut store = seeded();
        let draft = TaskDraft::new("Retro notes", 1)
            .with_status(Status::Done)
            .assigned_to(Assignee::new(3, "John Doe"));
        let id = store.add_task(draft).unwrap();
        assert_eq!(store.task_by_id(id).unwrap().completed_at(), Some(store.now()));
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut store = seeded();
        let first = store.add_task(TaskDraft::new("One", 1)).unwrap();
        assert!(store.delete_task(first));
        let second = store.add_task(TaskDraft::new("Two", 1)).unwrap();
        assert_ne!(first, second);
    }

    #[rstest]
    #[case(Status::Todo)]
    #[case(Status::InProgress)]
    #[case(Status::Done)]
    #[case(Status::Blocked)]
    #[case(Status::Pending)]
    fn test_status_change_refreshes_updated_at(#[case] status: Status) {
        let mut store = seeded();
        for id in [1, 2, 3, 4] {
            let before = store.task_by_id(id).unwrap().updated_at;
            assert_eq!(store.update_task_status(id, status), Ok(true));
            let task = store.task_by_id(id).unwrap();
            assert_eq!(task.status(), status);
            assert!(task.updated_at > before);
        }
        assert_lifecycle_invariants(&store);
    }

    #[test]
    fn test_repeated_status_changes_stay_strictly_increasing() {
        // The clock never moves; timestamps must still advance.
        let mut store = seeded();
        let mut last = store.task_by_id(2).unwrap().updated_at;
        for status in [Status::Done, Status::Done, Status::Todo, Status::Todo] {
            store.update_task_status(2, status).unwrap();
            let now = store.task_by_id(2).unwrap().updated_at;
            assert!(now > last);
            last = now;
        }
    }

    #[test]
    fn test_done_sets_and_clears_completed_at() {
        let clock = clock();
        let mut store = seeded_with(&clock);
        store.update_task_status(2, Status::Done).unwrap();
        let done_at = store.task_by_id(2).unwrap().completed_at();
        assert!(done_at.is_some());

        clock.advance(Duration::hours(1));
        store.update_task_status(2, Status::InProgress).unwrap();
        assert_eq!(store.task_by_id(2).unwrap().completed_at(), None);
    }

    #[test]
    fn test_blocked_to_in_progress_keeps_blocker_reason() {
        let mut store = seeded();
        let mut draft = TaskDraft::new("Provision staging", 1)
            .with_status(Status::Blocked)
            .assigned_to(Assignee::new(3, "John Doe"));
        draft.blocker_reason = Some("waiting on X".into());
        let id = store.add_task(draft).unwrap();

        store.update_task_status(id, Status::InProgress).unwrap();
        let task = store.task_by_id(id).unwrap();
        assert_eq!(task.status(), Status::InProgress);
        assert_eq!(task.completed_at(), None);
        assert_eq!(task.blocker_reason.as_deref(), Some("waiting on X"));
    }

    #[test]
    fn test_update_request_cleared_only_on_real_change() {
        let mut store = seeded();
        // Task 8 is in progress with an outstanding request.
        store.update_task_status(8, Status::InProgress).unwrap();
        assert!(store.task_by_id(8).unwrap().update_requested);

        store.update_task_status(8, Status::Done).unwrap();
        assert!(!store.task_by_id(8).unwrap().update_requested);
    }

    #[test]
    fn test_unassigned_task_cannot_start_work() {
        let mut store = seeded();
        assert_eq!(
            store.update_task_status(9, Status::InProgress),
            Err(StoreError::Unassigned(9))
        );
        assert_eq!(store.task_by_id(9).unwrap().status(), Status::Pending);
    }

    #[test]
    fn test_pending_returns_task_to_backlog() {
        let mut store = seeded();
        store.update_task_status(4, Status::Pending).unwrap();
        let task = store.task_by_id(4).unwrap();
        assert_eq!(task.status(), Status::Pending);
        assert_eq!(task.assignee_id(), None);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    #[case(9)]
    fn test_assign_always_lands_in_todo(#[case] id: TaskId) {
        let mut store = seeded();
        assert_eq!(store.assign_task(id, 4, "Jane Smith"), Ok(true));
        let task = store.task_by_id(id).unwrap();
        assert_eq!(task.status(), Status::Todo);
        assert_eq!(task.assignee_id(), Some(4));
        assert_eq!(task.completed_at(), None);
        assert_lifecycle_invariants(&store);
    }

    #[test]
    fn test_assign_rejects_unknown_user() {
        let mut store = seeded();
        assert_eq!(
            store.assign_task(9, 42, "Nobody"),
            Err(StoreError::UnknownAssignee(42))
        );
    }

    #[test]
    fn test_missing_ids_are_no_ops() {
        let mut store = seeded();
        let before = store.snapshot();
        assert_eq!(store.update_task_status(404, Status::Done), Ok(false));
        assert_eq!(store.assign_task(404, 3, "John Doe"), Ok(false));
        assert_eq!(store.update_task(404, TaskPatch::default()), Ok(false));
        assert!(!store.delete_task(404));
        assert!(!store.request_update(404));
        assert!(!store.clear_update_request(404));
        let comment = CommentDraft::new(2, "Manager User", Role::Manager, "ping");
        assert_eq!(store.add_comment(404, comment), Ok(None));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_update_task_merges_fields() {
        let mut store = seeded();
        let before = store.task_by_id(4).unwrap().clone();
        let patch = TaskPatch {
            title: Some("Write REST API documentation".into()),
            priority: Some(Priority::High),
            due_date: Some(None),
            ..TaskPatch::default()
        };
        assert_eq!(store.update_task(4, patch), Ok(true));
        let task = store.task_by_id(4).unwrap();
        assert_eq!(task.title, "Write REST API documentation");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, None);
        assert_eq!(task.description, before.description);
        assert_eq!(task.status(), Status::Todo);
        assert!(task.updated_at > before.updated_at);
    }

    #[test]
    fn test_update_task_to_done_stamps_completion() {
        let mut store = seeded();
        let patch = TaskPatch {
            status: Some(Status::Done),
            ..TaskPatch::default()
        };
        store.update_task(5, patch).unwrap();
        let task = store.task_by_id(5).unwrap();
        assert_eq!(task.completed_at(), Some(task.updated_at));
    }

    #[test]
    fn test_update_task_leaving_done_clears_completion() {
        let clock = clock();
        let mut store = seeded_with(&clock);
        assert!(store.task_by_id(1).unwrap().completed_at().is_some());

        clock.advance(Duration::hours(1));
        let patch = TaskPatch {
            status: Some(Status::InProgress),
            title: Some("Reopen homepage design".into()),
            ..TaskPatch::default()
        };
        assert_eq!(store.update_task(1, patch), Ok(true));
        let task = store.task_by_id(1).unwrap();
        assert_eq!(task.status(), Status::InProgress);
        assert_eq!(task.completed_at(), None);
        assert_eq!(task.assignee_id(), Some(3));
        assert_eq!(task.title, "Reopen homepage design");
        assert_lifecycle_invariants(&store);
    }

    #[test]
    fn test_update_task_status_on_unassigned_task_writes_nothing() {
        let mut store = seeded();
        let publishes = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&publishes);
        store.subscribe(move |_| *sink.borrow_mut() += 1);
        let before = store.snapshot();

        let patch = TaskPatch {
            title: Some("Renamed backlog item".into()),
            status: Some(Status::InProgress),
            ..TaskPatch::default()
        };
        assert_eq!(store.update_task(9, patch), Err(StoreError::Unassigned(9)));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(*publishes.borrow(), 0);
        let task = store.task_by_id(9).unwrap();
        assert_eq!(task.title, queries::task_by_id(&before, 9).unwrap().title);
        assert_eq!(task.status(), Status::Pending);
    }

    #[test]
    fn test_update_task_rejects_empty_title() {
        let mut store = seeded();
        let patch = TaskPatch {
            title: Some("  ".into()),
            ..TaskPatch::default()
        };
        assert_eq!(store.update_task(4, patch), Err(StoreError::EmptyTitle));
    }

    #[test]
    fn test_delete_removes_task() {
        let mut store = seeded();
        assert!(store.delete_task(3));
        assert!(store.task_by_id(3).is_none());
        assert_eq!(store.tasks().len(), 11);
        assert!(!store.delete_task(3));
    }

    #[test]
    fn test_comments_append_in_order() {
        let mut store = seeded();
        let first = CommentDraft::new(3, "John Doe", Role::Member, "Started on the navbar")
            .with_link("https://example.com/pr/12")
            .with_image_url("https://example.com/navbar.png");
        let second = CommentDraft::new(2, "Manager User", Role::Manager, "Thanks!");
        let a = store.add_comment(2, first).unwrap().unwrap();
        let b = store.add_comment(2, second).unwrap().unwrap();
        assert!(b > a);

        let task = store.task_by_id(2).unwrap();
        let contents: Vec<&str> = task.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "Great progress! Make sure to test on mobile devices before wrapping up.",
                "Started on the navbar",
                "Thanks!",
            ]
        );
        assert_eq!(task.comments[1].task_id, 2);
        assert_eq!(task.comments[1].link.as_deref(), Some("https://example.com/pr/12"));
        assert_eq!(
            task.comments[1].image_url.as_deref(),
            Some("https://example.com/navbar.png")
        );
        assert_eq!(task.comments[2].image_url, None);
        // Seeded comments already use ids 1-3.
        assert_eq!(a, 4);
    }

    #[test]
    fn test_empty_comment_rejected() {
        let mut store = seeded();
        let blank = CommentDraft::new(3, "John Doe", Role::Member, "");
        assert_eq!(store.add_comment(2, blank), Err(StoreError::EmptyComment));
    }

    #[test]
    fn test_update_request_flags_are_idempotent() {
        let mut store = seeded();
        assert!(store.request_update(4));
        assert!(store.task_by_id(4).unwrap().update_requested);

        store.clear_update_request(4);
        let once = store.task_by_id(4).unwrap().clone();
        store.clear_update_request(4);
        let twice = store.task_by_id(4).unwrap().clone();
        assert_eq!(once, twice);
        assert!(!twice.update_requested);
    }

    #[test]
    fn test_redundant_update_request_change_is_silent() {
        let mut store = seeded();
        let publishes = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&publishes);
        store.subscribe(move |_| *sink.borrow_mut() += 1);
        let before = store.snapshot();

        assert!(store.clear_update_request(4));
        assert!(store.request_update(8));
        assert_eq!(*publishes.borrow(), 0);
        assert!(Arc::ptr_eq(&before, &store.snapshot()));

        assert!(store.request_update(4));
        assert_eq!(*publishes.borrow(), 1);
    }

    #[test]
    fn test_old_snapshot_is_unaffected_by_mutation() {
        let mut store = seeded();
        let old = store.snapshot();
        store.update_task_status(6, Status::Done).unwrap();
        store.delete_task(1);
        assert_eq!(old.len(), 12);
        assert_eq!(
            queries::task_by_id(&old, 6).map(|t| t.status()),
            Some(Status::Todo)
        );
        assert_eq!(store.task_by_id(6).map(|t| t.status()), Some(Status::Done));
    }

    #[test]
    fn test_subscribers_see_each_published_snapshot() {
        let mut store = seeded();
        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.len()));

        store.add_task(TaskDraft::new("Kickoff", 2)).unwrap();
        store.delete_task(404);
        store.update_task_status(404, Status::Done).unwrap();
        store.delete_task(1);
        assert_eq!(*seen.borrow(), vec![13, 12]);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.delete_task(2);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_project_stats_scenario() {
        let dir = seed::directory();
        let mut store = TaskStore::new(dir, Vec::new(), Box::new(clock()));
        let ids: Vec<TaskId> = (0..4)
            .map(|i| {
                let draft = TaskDraft::new(format!("Task {i}"), 2)
                    .assigned_to(Assignee::new(3, "John Doe"));
                store.add_task(draft).unwrap()
            })
            .collect();
        store.update_task_status(ids[0], Status::Done).unwrap();
        store.update_task_status(ids[1], Status::Blocked).unwrap();

        let stats = store.project_stats(2);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.blocked, 1);
        assert_eq!(stats.todo, 2);
        assert_eq!(stats.completion_rate, 25);
    }

    #[test]
    fn test_store_overdue_uses_clock() {
        let store = seeded();
        let ids: Vec<TaskId> = store.overdue_tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 6]);
    }
}
