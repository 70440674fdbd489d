//! Kanban board over the task store.
//!
//! Columns follow task status. Who is acting decides what the board shows
//! (members only see their own cards) and which actions are allowed. The board
//! never edits tasks itself: every change goes through the store, and the
//! columns are rebuilt when the store publishes a new snapshot.

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::display::{
    format_due_relative, format_priority, format_role, format_status, project_label,
};
use crate::error::StoreError;
use crate::fields::*;
use crate::queries;
use crate::session::Session;
use crate::store::{SubscriptionId, TaskStore};
use crate::task::{CommentDraft, Task, TaskPatch};
use crate::validate;
use crate::tui::colors::{role_color, status_color, text_on, DARK_RED};
use crate::tui::enums::BoardState;
use crate::tui::input::InputField;
use crate::tui::task_form::{TaskForm, DESCRIPTION_FIELD, DUE_FIELD, LABEL_WIDTH, TITLE_FIELD};

/// Column order, left to right.
pub const COLUMNS: [Status; 5] = [
    Status::Pending,
    Status::Todo,
    Status::InProgress,
    Status::Blocked,
    Status::Done,
];

const CARD_HEIGHT: usize = 6;

/// Board application state
pub struct BoardApp {
    store: TaskStore,
    session: Session,
    /// Set by the store subscription, consumed by `sync`.
    dirty: Rc<Cell<bool>>,
    subscription: SubscriptionId,
    state: BoardState,
    selected_column: usize,
    selected_card: usize,
    column_scroll_offsets: [usize; 5],
    columns: [Vec<TaskId>; 5],
    project_filter: Option<ProjectId>,
    filter_text: String,
    input: InputField,
    /// Comment collected so far while the link and image prompts are open.
    pending_comment: Option<CommentDraft>,
    form: TaskForm,
    assign_choice: usize,
    status_message: String,
}

impl BoardApp {
    pub fn new(mut store: TaskStore, session: Session) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        let subscription = store.subscribe(move |_| flag.set(true));
        let form = TaskForm::new(store.directory(), None);

        let mut app = BoardApp {
            store,
            session,
            dirty,
            subscription,
            state: BoardState::Board,
            selected_column: 0,
            selected_card: 0,
            column_scroll_offsets: [0; 5],
            columns: Default::default(),
            project_filter: None,
            filter_text: String::new(),
            input: InputField::new(),
            pending_comment: None,
            form,
            assign_choice: 0,
            status_message: String::new(),
        };
        app.update_columns();
        app
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    fn role(&self) -> Role {
        self.session.current_user().role
    }

    fn selected_task_id(&self) -> Option<TaskId> {
        self.columns[self.selected_column]
            .get(self.selected_card)
            .copied()
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id().and_then(|id| self.store.task_by_id(id))
    }

    /// Rebuild the columns from the store for the acting user and filters.
    fn update_columns(&mut self) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.clear();
            self.column_scroll_offsets[i] = 0;
        }

        let filter_lower = self.filter_text.to_lowercase();
        let project_filter = self.project_filter;
        let user = self.session.current_user();
        let shown = self.store.visible_to(user).into_iter().filter(|task| {
            if project_filter.is_some_and(|p| task.project_id != p) {
                return false;
            }
            filter_lower.is_empty()
                || task.title.to_lowercase().contains(&filter_lower)
                || task
                    .assignee_name()
                    .is_some_and(|n| n.to_lowercase().contains(&filter_lower))
        });
        let mut grouped = queries::group_by_status(shown);
        for (column, status) in self.columns.iter_mut().zip(COLUMNS) {
            if let Some(tasks) = grouped.remove(&status) {
                column.extend(tasks.iter().map(|t| t.id));
            }
        }

        self.clamp_selection();
    }

    /// Pick up a snapshot published since the last look.
    fn sync(&mut self) {
        if self.dirty.replace(false) {
            self.update_columns();
        }
    }

    fn clamp_selection(&mut self) {
        if self.selected_column >= self.columns.len() {
            self.selected_column = 0;
        }
        let column_len = self.columns[self.selected_column].len();
        if column_len == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= column_len {
            self.selected_card = column_len - 1;
        }
    }

    /// Move the selection onto `task_id` wherever it now sits.
    fn select_task(&mut self, task_id: TaskId) {
        for (col, ids) in self.columns.iter().enumerate() {
            if let Some(pos) = ids.iter().position(|&id| id == task_id) {
                self.selected_column = col;
                self.selected_card = pos;
                return;
            }
        }
        self.clamp_selection();
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Handle a single key press. Returns `true` when the board should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.state {
            BoardState::Filter => {
                self.handle_filter_key(key);
                return false;
            }
            state if state.takes_text() => {
                self.handle_text_key(key);
                return false;
            }
            BoardState::CreateTask => {
                self.handle_form_key(key);
                return false;
            }
            BoardState::Assign => {
                self.handle_assign_key(key);
                return false;
            }
            BoardState::ConfirmDelete => {
                if key.code == KeyCode::Char('y') {
                    self.delete_selected();
                } else {
                    self.set_status_message("Delete cancelled");
                }
                self.state = BoardState::Board;
                return false;
            }
            BoardState::Detail => {
                match key.code {
                    KeyCode::Char('n') => self.start_comment(),
                    KeyCode::Enter | KeyCode::Esc => self.state = BoardState::Board,
                    _ => {}
                }
                return false;
            }
            BoardState::Help => {
                self.state = BoardState::Board;
                return false;
            }
            _ => {}
        }

        self.clear_status_message();

        match key.code {
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc => return true,

            KeyCode::Left if key.modifiers.contains(KeyModifiers::CONTROL) => self.move_card(false),
            KeyCode::Right if key.modifiers.contains(KeyModifiers::CONTROL) => self.move_card(true),

            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column < self.columns.len() - 1 {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => {
                self.selected_card = self.selected_card.saturating_sub(1);
            }
            KeyCode::Down => {
                let column_len = self.columns[self.selected_column].len();
                if column_len > 0 && self.selected_card < column_len - 1 {
                    self.selected_card += 1;
                }
            }

            KeyCode::Enter => {
                if self.selected_task_id().is_some() {
                    self.state = BoardState::Detail;
                }
            }
            KeyCode::Char('a') => self.start_assign(),
            KeyCode::Char('b') => self.start_block(),
            KeyCode::Char('c') => self.start_create(),
            KeyCode::Char('n') => self.start_comment(),
            KeyCode::Char('r') => self.toggle_update_request(),
            KeyCode::Char('x') => self.start_delete(),
            KeyCode::Char('R') => self.switch_role(),
            KeyCode::Char('p') => self.cycle_project(),
            KeyCode::Char('/') => {
                self.state = BoardState::Filter;
                self.set_status_message(
                    "Filter: type to search title/assignee, Enter to apply, Esc to cancel",
                );
            }
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = BoardState::Help,
            _ => {}
        }
        false
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state = BoardState::Board;
                self.filter_text.clear();
                self.update_columns();
                self.clear_status_message();
            }
            KeyCode::Enter => {
                self.state = BoardState::Board;
                if self.filter_text.is_empty() {
                    self.set_status_message("Filter cleared");
                } else {
                    let shown: usize = self.columns.iter().map(|col| col.len()).sum();
                    self.set_status_message(format!(
                        "Filter: '{}' ({} tasks shown)",
                        self.filter_text, shown
                    ));
                }
            }
            KeyCode::Backspace => {
                if self.filter_text.pop().is_some() {
                    self.update_columns();
                }
            }
            KeyCode::Char(c) => {
                self.filter_text.push(c);
                self.update_columns();
            }
            _ => {}
        }
    }

    fn handle_text_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input.clear();
                self.pending_comment = None;
                self.state = BoardState::Board;
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state = BoardState::Board;
                self.set_status_message("New task discarded");
            }
            KeyCode::Enter => self.save_form(),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => self.form.handle_left_right(false),
            KeyCode::Right => self.form.handle_left_right(true),
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Char(c) => self.form.handle_char(c),
            _ => {}
        }
    }

    fn handle_assign_key(&mut self, key: KeyEvent) {
        let member_count = self.store.directory().members().count();
        match key.code {
            KeyCode::Esc => self.state = BoardState::Board,
            KeyCode::Up => self.assign_choice = self.assign_choice.saturating_sub(1),
            KeyCode::Down => {
                if self.assign_choice + 1 < member_count {
                    self.assign_choice += 1;
                }
            }
            KeyCode::Enter => {
                self.confirm_assign();
                self.state = BoardState::Board;
            }
            _ => {}
        }
    }

    /// Shift the selected card one column left or right.
    fn move_card(&mut self, forward: bool) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let target = if forward {
            self.selected_column + 1
        } else {
            match self.selected_column.checked_sub(1) {
                Some(col) => col,
                None => return,
            }
        };
        let Some(&status) = COLUMNS.get(target) else {
            return;
        };
        if status == Status::Pending && !self.role().can_assign() {
            self.set_status_message("Only managers and admins can return tasks to the backlog");
            return;
        }

        match self.store.update_task_status(task_id, status) {
            Ok(true) => {
                self.sync();
                self.select_task(task_id);
                self.set_status_message(format!("Moved #{} to {}", task_id, format_status(status)));
            }
            Ok(false) => self.set_status_message(format!("Task #{} no longer exists", task_id)),
            Err(StoreError::Unassigned(_)) => {
                self.set_status_message(format!("Assign #{} before starting work (a)", task_id))
            }
            Err(e) => self.set_status_message(format!("Error: {}", e)),
        }
    }

    fn start_assign(&mut self) {
        if !self.role().can_assign() {
            self.set_status_message("Only managers and admins can assign tasks");
            return;
        }
        let Some(task) = self.selected_task() else {
            return;
        };
        let current = task.assignee_id();
        self.assign_choice = self
            .store
            .directory()
            .members()
            .position(|u| Some(u.id) == current)
            .unwrap_or(0);
        self.state = BoardState::Assign;
    }

    fn confirm_assign(&mut self) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let Some((user_id, name)) = self
            .store
            .directory()
            .members()
            .nth(self.assign_choice)
            .map(|u| (u.id, u.name.clone()))
        else {
            self.set_status_message("No team members to assign to");
            return;
        };

        match self.store.assign_task(task_id, user_id, &name) {
            Ok(true) => {
                self.sync();
                self.select_task(task_id);
                self.set_status_message(format!("Assigned #{} to {}", task_id, name));
            }
            Ok(false) => self.set_status_message(format!("Task #{} no longer exists", task_id)),
            Err(e) => self.set_status_message(format!("Error: {}", e)),
        }
    }

    fn start_create(&mut self) {
        if !self.role().can_assign() {
            self.set_status_message("Only managers and admins can create tasks");
            return;
        }
        self.form = TaskForm::new(self.store.directory(), self.project_filter);
        self.state = BoardState::CreateTask;
    }

    /// Hand the form to the store. The form stays open when anything is
    /// rejected so the entry can be fixed.
    fn save_form(&mut self) {
        let draft = match self.form.to_draft(self.store.today()) {
            Ok(draft) => draft,
            Err(msg) => {
                self.set_status_message(msg);
                return;
            }
        };
        match self.store.add_task(draft) {
            Ok(task_id) => {
                self.state = BoardState::Board;
                self.sync();
                self.select_task(task_id);
                self.set_status_message(format!("Created #{}", task_id));
            }
            Err(e) => self.set_status_message(format!("Error: {}", e)),
        }
    }

    fn start_block(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        if task.assignee_id().is_none() {
            let msg = format!("Assign #{} before blocking it (a)", task.id);
            self.set_status_message(msg);
            return;
        }
        self.input.clear();
        self.state = BoardState::BlockReason;
    }

    fn start_comment(&mut self) {
        if self.selected_task_id().is_none() {
            return;
        }
        self.input.clear();
        self.pending_comment = None;
        self.state = BoardState::Comment;
    }

    fn submit_input(&mut self) {
        let state = self.state;
        self.state = BoardState::Board;
        let text = self.input.take();
        let Some(task_id) = self.selected_task_id() else {
            self.pending_comment = None;
            return;
        };

        let result = match state {
            BoardState::BlockReason => {
                let patch = TaskPatch {
                    status: Some(Status::Blocked),
                    blocker_reason: Some((!text.is_empty()).then_some(text)),
                    ..TaskPatch::default()
                };
                self.store
                    .update_task(task_id, patch)
                    .map(|found| found.then(|| format!("Blocked #{}", task_id)))
            }
            BoardState::Comment => {
                let user = self.session.current_user();
                let draft = CommentDraft::new(user.id, user.name.clone(), user.role, text);
                if let Err(e) = validate::validate_comment(&draft) {
                    self.set_status_message(format!("Error: {}", e));
                    return;
                }
                self.pending_comment = Some(draft);
                self.state = BoardState::CommentLink;
                return;
            }
            BoardState::CommentLink => {
                self.pending_comment = self.pending_comment.take().map(|draft| {
                    if text.is_empty() {
                        draft
                    } else {
                        draft.with_link(text)
                    }
                });
                self.state = BoardState::CommentImage;
                return;
            }
            BoardState::CommentImage => {
                let Some(mut draft) = self.pending_comment.take() else {
                    return;
                };
                if !text.is_empty() {
                    draft = draft.with_image_url(text);
                }
                self.store
                    .add_comment(task_id, draft)
                    .map(|id| id.map(|_| format!("Comment added to #{}", task_id)))
            }
            _ => return,
        };

        match result {
            Ok(Some(msg)) => {
                self.sync();
                self.select_task(task_id);
                self.set_status_message(msg);
            }
            Ok(None) => self.set_status_message(format!("Task #{} no longer exists", task_id)),
            Err(e) => self.set_status_message(format!("Error: {}", e)),
        }
    }

    /// Managers raise or withdraw an update request; members can only
    /// acknowledge one that is outstanding on their task.
    fn toggle_update_request(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (task_id, requested) = (task.id, task.update_requested);

        let msg = if self.role().can_request_update() {
            if requested {
                self.store.clear_update_request(task_id);
                format!("Withdrew update request on #{}", task_id)
            } else {
                self.store.request_update(task_id);
                format!("Requested an update on #{}", task_id)
            }
        } else if requested {
            self.store.clear_update_request(task_id);
            format!("Acknowledged update request on #{}", task_id)
        } else {
            "Only managers and admins can request updates".to_string()
        };
        self.sync();
        self.set_status_message(msg);
    }

    fn start_delete(&mut self) {
        if !self.role().can_delete() {
            self.set_status_message("Only managers and admins can delete tasks");
            return;
        }
        if self.selected_task_id().is_some() {
            self.state = BoardState::ConfirmDelete;
        }
    }

    fn delete_selected(&mut self) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        if self.store.delete_task(task_id) {
            self.sync();
            self.set_status_message(format!("Deleted #{}", task_id));
        }
    }

    fn switch_role(&mut self) {
        let next = self.role().next();
        if self.session.switch_role(next) {
            let user = self.session.current_user();
            let msg = format!("Acting as {} ({})", user.name, format_role(user.role));
            debug!("{}", msg);
            self.update_columns();
            self.set_status_message(msg);
        } else {
            self.set_status_message(format!("No user with role {}", format_role(next)));
        }
    }

    /// All projects, then each project in turn.
    fn cycle_project(&mut self) {
        let projects = self.store.directory().projects();
        self.project_filter = match self.project_filter {
            None => projects.first().map(|p| p.id),
            Some(current) => projects
                .iter()
                .position(|p| p.id == current)
                .and_then(|i| projects.get(i + 1))
                .map(|p| p.id),
        };
        self.update_columns();
        let label = self.project_filter_label();
        self.set_status_message(format!("Project: {}", label));
    }

    fn project_filter_label(&self) -> String {
        match self.project_filter {
            Some(id) => project_label(self.store.directory(), id),
            None => "All".to_string(),
        }
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_board(f, chunks[1]);
        self.render_status_bar(f, chunks[2]);

        match self.state {
            BoardState::Detail => self.render_task_detail_popup(f),
            BoardState::Assign => self.render_assign_popup(f),
            state if state.takes_text() => self.render_input_popup(f),
            BoardState::CreateTask => self.render_form_popup(f),
            BoardState::ConfirmDelete => self.render_confirm_popup(f),
            BoardState::Help => render_help_popup(f),
            _ => {}
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let user = self.session.current_user();
        let context_display = format!(
            "Acting as: {} ({})  Project: {}",
            user.name,
            format_role(user.role),
            self.project_filter_label()
        );

        let header_text = vec![Line::from(vec![
            Span::styled("TEAM BOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                context_display,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];

        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let column_count = self.columns.len();
        let constraints: Vec<Constraint> = (0..column_count)
            .map(|_| Constraint::Ratio(1, column_count as u32))
            .collect();

        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize) {
        let is_selected = column_index == self.selected_column;
        let status = COLUMNS[column_index];
        let color = status_color(status);

        let border_style = if is_selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let title = format!("{} ({})", format_status(status), self.columns[column_index].len());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.columns[column_index].is_empty() {
            return;
        }

        let available_height = inner.height as usize;
        let visible_cards = available_height / CARD_HEIGHT;

        // Keep the selected card in view.
        let scroll_offset = if is_selected {
            let start_visible = self.column_scroll_offsets[column_index];
            let end_visible = start_visible + visible_cards;
            if self.selected_card < start_visible {
                self.column_scroll_offsets[column_index] = self.selected_card;
                self.selected_card
            } else if self.selected_card >= end_visible && visible_cards > 0 {
                let new_offset = self.selected_card + 1 - visible_cards;
                self.column_scroll_offsets[column_index] = new_offset;
                new_offset
            } else {
                start_visible
            }
        } else {
            self.column_scroll_offsets[column_index]
        };

        let today = self.store.today();
        let mut current_y = 0;
        let mut rendered_cards = 0;
        let cards = &self.columns[column_index];
        for (card_index, &task_id) in cards.iter().enumerate().skip(scroll_offset) {
            let Some(task) = self.store.task_by_id(task_id) else {
                continue;
            };
            if current_y + CARD_HEIGHT > available_height {
                break;
            }
            let card_area = Rect {
                x: inner.x,
                y: inner.y + current_y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            let selected = is_selected && card_index == self.selected_card;
            render_card(f, card_area, task, selected, today);
            current_y += CARD_HEIGHT;
            rendered_cards += 1;
        }

        if scroll_offset > 0 {
            let indicator = Paragraph::new(format!("\u{25b2} +{} above", scroll_offset))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { height: 1, ..inner });
        }
        let remaining = cards.len().saturating_sub(scroll_offset + rendered_cards);
        if remaining > 0 && inner.height > 0 {
            let indicator = Paragraph::new(format!("\u{25bc} +{} below", remaining))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(
                indicator,
                Rect {
                    y: inner.y + inner.height - 1,
                    height: 1,
                    ..inner
                },
            );
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if self.state == BoardState::Filter {
            format!(
                "Filter: {} | Type to search, Enter to apply, Esc to cancel",
                self.filter_text
            )
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let total_tasks: usize = self.columns.iter().map(|col| col.len()).sum();
            let filter_indicator = if self.filter_text.is_empty() {
                String::new()
            } else {
                format!(" [Filter: {}]", self.filter_text)
            };
            format!(
                "Tasks: {}{} | Ctrl+\u{2190}/\u{2192}: Move | c: New | a: Assign | b: Block | \
                 n: Comment | r: Request update | R: Role | p: Project | h: Help",
                total_tasks, filter_indicator
            )
        };

        let color = role_color(self.role());
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(color).fg(text_on(color)))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_task_detail_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let popup_area = centered_rect(80, 80, f.area());
        f.render_widget(Clear, popup_area);

        let today = self.store.today();
        let due_str = match task.due_date {
            Some(d) => format!("{} ({})", d, format_due_relative(Some(d), today)),
            None => "-".to_string(),
        };

        let mut detail_lines = vec![
            Line::from(vec![Span::styled(
                format!("Task #{}: {}", task.id, task.title),
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(format!("Status:       {}", format_status(task.status()))),
            Line::from(format!("Priority:     {}", format_priority(task.priority))),
            Line::from(format!(
                "Assignee:     {}",
                task.assignee_name().unwrap_or("Unassigned")
            )),
            Line::from(format!(
                "Project:      {}",
                project_label(self.store.directory(), task.project_id)
            )),
            Line::from(format!("Due:          {}", due_str)),
        ];
        if let Some(reason) = &task.blocker_reason {
            detail_lines.push(Line::from(format!("Blocker:      {}", reason)));
        }
        if task.update_requested {
            detail_lines.push(Line::from(Span::styled(
                "Update requested by management",
                Style::default().fg(Color::Yellow),
            )));
        }
        detail_lines.extend([
            Line::from(""),
            Line::from("Description:"),
            Line::from(task.description.as_deref().unwrap_or("-").to_string()),
            Line::from(""),
            Line::from(format!("Comments ({}):", task.comments.len())),
        ]);
        for c in &task.comments {
            detail_lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ({}) ", c.user_name, format_role(c.user_role)),
                    Style::default().fg(role_color(c.user_role)).add_modifier(Modifier::BOLD),
                ),
                Span::raw(c.created_at.format("%Y-%m-%d %H:%M").to_string()),
            ]));
            detail_lines.push(Line::from(format!("  {}", c.content)));
            if let Some(link) = &c.link {
                detail_lines.push(Line::from(format!("  link: {}", link)));
            }
            if let Some(image) = &c.image_url {
                detail_lines.push(Line::from(format!("  image: {}", image)));
            }
        }

        let popup_block = Block::default()
            .borders(Borders::ALL)
            .title("Task Details (Enter to close, n to comment)")
            .title_alignment(Alignment::Center)
            .border_style(
                Style::default()
                    .fg(status_color(task.status()))
                    .add_modifier(Modifier::BOLD),
            );
        let popup_paragraph = Paragraph::new(detail_lines)
            .block(popup_block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup_paragraph, popup_area);
    }

    fn render_assign_popup(&self, f: &mut Frame) {
        let popup_area = centered_rect(40, 40, f.area());
        f.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = self
            .store
            .directory()
            .members()
            .enumerate()
            .map(|(i, u)| {
                let style = if i == self.assign_choice {
                    Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{} <{}>", u.name, u.email)).style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Assign to (Enter to confirm, Esc to cancel)"),
        );
        f.render_widget(list, popup_area);
    }

    fn render_input_popup(&self, f: &mut Frame) {
        let area = f.area();
        let width = (area.width * 60) / 100;
        let popup_area = Rect::new((area.width - width) / 2, area.height / 2, width, 3);
        f.render_widget(Clear, popup_area);

        let paragraph = Paragraph::new(self.input.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(self.state.input_title()),
        );
        f.render_widget(paragraph, popup_area);
        f.set_cursor_position((popup_area.x + 1 + self.input.cursor as u16, popup_area.y + 1));
    }

    fn render_form_popup(&self, f: &mut Frame) {
        let popup_area = centered_rect(60, 40, f.area());
        f.render_widget(Clear, popup_area);

        let lines: Vec<Line> = self
            .form
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let label_style = if i == self.form.current_field {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH), label_style),
                    Span::raw(value),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("New Task (Tab: next field, Enter: save, Esc: cancel)"),
            )
            .style(Style::default().bg(Color::Black));
        f.render_widget(paragraph, popup_area);

        let cursor = match self.form.current_field {
            TITLE_FIELD => Some(self.form.title.cursor),
            DESCRIPTION_FIELD => Some(self.form.description.cursor),
            DUE_FIELD => Some(self.form.due.cursor),
            _ => None,
        };
        if let Some(cursor) = cursor {
            f.set_cursor_position((
                popup_area.x + 1 + (LABEL_WIDTH + cursor) as u16,
                popup_area.y + 1 + self.form.current_field as u16,
            ));
        }
    }

    fn render_confirm_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let popup_area = centered_rect(50, 20, f.area());
        f.render_widget(Clear, popup_area);
        let text = vec![
            Line::from(format!("Delete task #{}: {}?", task.id, task.title)),
            Line::from(""),
            Line::from("y: delete   any other key: cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Confirm")
                    .border_style(Style::default().fg(DARK_RED)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, popup_area);
    }

    /// Main event loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(false)
    }
}

impl Drop for BoardApp {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

/// Word-wrap `title` to `width`, keeping at most `max_lines` lines.
fn wrap_title(title: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();
    for word in title.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + 1 + word.chars().count() <= width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current_line, word.to_string()));
            if lines.len() >= max_lines {
                return lines;
            }
        }
    }
    if !current_line.is_empty() && lines.len() < max_lines {
        lines.push(current_line);
    }
    lines
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    task: &Task,
    is_selected: bool,
    today: chrono::NaiveDate,
) {
    let color = status_color(task.status());
    let style = if is_selected {
        Style::default().bg(color).fg(text_on(color)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };

    let mut flags = String::new();
    if task.update_requested {
        flags.push_str(" !");
    }
    if task.ai_generated {
        flags.push_str(" ai");
    }
    if !task.comments.is_empty() {
        flags.push_str(&format!(" \u{270e}{}", task.comments.len()));
    }

    let mut card_text = vec![Line::from(format!(
        "#{} {}{}",
        task.id,
        format_priority(task.priority),
        flags
    ))];
    let available_width = area.width.saturating_sub(2) as usize;
    card_text.extend(wrap_title(&task.title, available_width, 2).into_iter().map(Line::from));

    let due_style = if task.is_overdue(today) {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    card_text.push(Line::from(vec![
        Span::raw(format!("{} | ", task.assignee_name().unwrap_or("-"))),
        Span::styled(format_due_relative(task.due_date, today), due_style),
    ]));

    let card_block = Paragraph::new(card_text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(card_block, area);
}

fn render_help_popup(f: &mut Frame) {
    let popup_area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, popup_area);
    let keys = [
        ("\u{2190}/\u{2192} \u{2191}/\u{2193}", "Select column / card"),
        ("Ctrl+\u{2190}/\u{2192}", "Move card to the previous / next status"),
        ("Enter", "Task details and comments"),
        ("a", "Assign to a team member (managers, admins)"),
        ("b", "Mark blocked with a reason"),
        ("c", "Create a task (managers, admins)"),
        ("n", "Add a comment, with optional link and image"),
        ("r", "Request an update / acknowledge a request"),
        ("x", "Delete task (managers, admins)"),
        ("R", "Switch role"),
        ("p", "Cycle project filter"),
        ("/", "Filter by title or assignee"),
        ("Esc", "Quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{:<14}", key), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(*what),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Keys (any key to close)"))
        .style(Style::default().bg(Color::Black));
    f.render_widget(paragraph, popup_area);
}

/// Rect of `percent_x` by `percent_y` centered in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (area.width * percent_x) / 100;
    let height = (area.height * percent_y) / 100;
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::seed;
    use chrono::{TimeZone, Utc};
    use ratatui::backend::TestBackend;

    fn app() -> BoardApp {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 24, 9, 0, 0).unwrap());
        let store = TaskStore::new(seed::directory(), seed::tasks(), Box::new(clock));
        let session = Session::new(seed::users()).unwrap();
        BoardApp::new(store, session)
    }

    fn press(app: &mut BoardApp, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut BoardApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut BoardApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn column_index(status: Status) -> usize {
        COLUMNS.iter().position(|s| *s == status).unwrap()
    }

    fn column_of(app: &BoardApp, status: Status) -> &[TaskId] {
        &app.columns[column_index(status)]
    }

    #[test]
    fn test_columns_follow_status() {
        let app = app();
        assert_eq!(column_of(&app, Status::Pending), &[9, 10, 11, 12]);
        assert_eq!(column_of(&app, Status::Todo), &[4, 6]);
        assert_eq!(column_of(&app, Status::InProgress), &[2, 5, 8]);
        assert_eq!(column_of(&app, Status::Blocked), &[3]);
        assert_eq!(column_of(&app, Status::Done), &[1, 7]);
    }

    #[test]
    fn test_ctrl_right_moves_card_and_follows_it() {
        let mut app = app();
        app.selected_column = column_index(Status::Todo);
        ctrl(&mut app, KeyCode::Right);
        assert_eq!(app.store().task_by_id(4).unwrap().status(), Status::InProgress);
        assert_eq!(app.selected_column, column_index(Status::InProgress));
        assert_eq!(app.selected_task_id(), Some(4));
        assert_eq!(column_of(&app, Status::InProgress), &[2, 4, 5, 8]);
    }

    #[test]
    fn test_unassigned_card_cannot_leave_backlog() {
        let mut app = app();
        ctrl(&mut app, KeyCode::Right);
        assert_eq!(app.store().task_by_id(9).unwrap().status(), Status::Pending);
        assert!(app.status_message.contains("Assign #9"));
    }

    #[test]
    fn test_assign_from_backlog() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, BoardState::Assign);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        let task = app.store().task_by_id(9).unwrap();
        assert_eq!(task.assignee_name(), Some("Jane Smith"));
        assert_eq!(task.status(), Status::Todo);
        assert_eq!(app.selected_task_id(), Some(9));
        assert_eq!(app.state, BoardState::Board);
    }

    #[test]
    fn test_block_with_reason() {
        let mut app = app();
        app.selected_column = column_index(Status::Todo);
        press(&mut app, KeyCode::Char('b'));
        type_text(&mut app, "waiting on API keys");
        press(&mut app, KeyCode::Enter);

        let task = app.store().task_by_id(4).unwrap();
        assert_eq!(task.status(), Status::Blocked);
        assert_eq!(task.blocker_reason.as_deref(), Some("waiting on API keys"));
        assert_eq!(column_of(&app, Status::Blocked), &[3, 4]);
    }

    #[test]
    fn test_comment_is_posted_as_acting_user() {
        let mut app = app();
        app.selected_column = column_index(Status::Todo);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Any blockers?");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, BoardState::CommentLink);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, BoardState::CommentImage);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, BoardState::Board);

        let task = app.store().task_by_id(4).unwrap();
        let comment = task.comments.last().unwrap();
        assert_eq!(comment.content, "Any blockers?");
        assert_eq!(comment.user_name, "Manager User");
        assert_eq!(comment.user_role, Role::Manager);
        assert_eq!(comment.link, None);
        assert_eq!(comment.image_url, None);
    }

    #[test]
    fn test_comment_link_and_image_reach_the_task() {
        let mut app = app();
        app.selected_column = column_index(Status::Todo);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Mockups attached");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, " https://example.com/design ");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "https://example.com/mock.png");
        press(&mut app, KeyCode::Enter);

        let comment = app.store().task_by_id(4).unwrap().comments.last().unwrap().clone();
        assert_eq!(comment.link.as_deref(), Some("https://example.com/design"));
        assert_eq!(comment.image_url.as_deref(), Some("https://example.com/mock.png"));
        assert_eq!(app.status_message, "Comment added to #4");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, BoardState::Detail);
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("link: https://example.com/design"));
        assert!(screen.contains("image: https://example.com/mock.png"));
    }

    #[test]
    fn test_empty_comment_is_rejected_before_prompts() {
        let mut app = app();
        app.selected_column = column_index(Status::Todo);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, BoardState::Board);
        assert_eq!(app.status_message, "Error: comment cannot be empty");
        assert!(app.store().task_by_id(4).unwrap().comments.is_empty());
    }

    #[test]
    fn test_escape_cancels_text_entry() {
        let mut app = app();
        app.selected_column = column_index(Status::Todo);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "draft");
        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.state, BoardState::Board);

        // Cancelling at the link prompt drops the whole comment.
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "draft");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, BoardState::Board);
        assert!(app.pending_comment.is_none());
        assert!(app.store().task_by_id(4).unwrap().comments.is_empty());
    }

    #[test]
    fn test_create_task_from_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.state, BoardState::CreateTask);

        type_text(&mut app, "Push notifications");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "iOS and Android");
        press(&mut app, KeyCode::Tab); // project, already Mobile App Development
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right); // High
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "in 2w");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right); // John Doe
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, BoardState::Board);
        assert_eq!(app.status_message, "Created #13");
        let task = app.store().task_by_id(13).unwrap();
        assert_eq!(task.title, "Push notifications");
        assert_eq!(task.description.as_deref(), Some("iOS and Android"));
        assert_eq!(task.project_id, 2);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, chrono::NaiveDate::from_ymd_opt(2025, 2, 7));
        assert_eq!(task.assignee_name(), Some("John Doe"));
        assert_eq!(task.status(), Status::Todo);
        assert!(!task.ai_generated);
        assert_eq!(app.selected_task_id(), Some(13));
        assert_eq!(column_of(&app, Status::Todo), &[4, 6, 13]);
    }

    #[test]
    fn test_create_task_keeps_form_open_on_rejection() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, BoardState::CreateTask);
        assert_eq!(app.status_message, "Error: task title cannot be empty");

        type_text(&mut app, "Audit");
        for _ in 0..4 {
            press(&mut app, KeyCode::Down);
        }
        type_text(&mut app, "next tuesday");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, BoardState::CreateTask);
        assert!(app.status_message.contains("next tuesday"));
        assert_eq!(app.store().tasks().len(), 12);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, BoardState::Board);
        assert_eq!(app.store().tasks().len(), 12);
    }

    #[test]
    fn test_members_cannot_create_tasks() {
        let mut app = app();
        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.state, BoardState::Board);
        assert_eq!(app.status_message, "Only managers and admins can create tasks");
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.store().task_by_id(9).is_some());

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.store().task_by_id(9).is_none());
        assert_eq!(column_of(&app, Status::Pending), &[10, 11, 12]);
    }

    #[test]
    fn test_member_view_and_permissions() {
        let mut app = app();
        press(&mut app, KeyCode::Char('R'));
        assert_eq!(app.session.current_user().name, "John Doe");
        let visible: usize = app.columns.iter().map(|c| c.len()).sum();
        assert_eq!(visible, 5);
        assert!(column_of(&app, Status::Pending).is_empty());

        app.selected_column = column_index(Status::InProgress);
        app.selected_card = 1;
        assert_eq!(app.selected_task_id(), Some(8));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.state, BoardState::Board);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, BoardState::Board);

        // Members can acknowledge an outstanding request but not raise one.
        press(&mut app, KeyCode::Char('r'));
        assert!(!app.store().task_by_id(8).unwrap().update_requested);
        press(&mut app, KeyCode::Char('r'));
        assert!(!app.store().task_by_id(8).unwrap().update_requested);
    }

    #[test]
    fn test_member_cannot_return_task_to_backlog() {
        let mut app = app();
        press(&mut app, KeyCode::Char('R'));
        app.selected_column = column_index(Status::Todo);
        ctrl(&mut app, KeyCode::Left);
        assert_eq!(app.store().task_by_id(4).unwrap().status(), Status::Todo);
    }

    #[test]
    fn test_filters() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "design");
        press(&mut app, KeyCode::Enter);
        let shown: Vec<TaskId> = app.columns.iter().flatten().copied().collect();
        assert_eq!(shown, vec![12, 5, 1]);

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.project_filter, Some(2));
        let shown: Vec<TaskId> = app.columns.iter().flatten().copied().collect();
        assert_eq!(shown, vec![12, 4, 6, 5]);
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.project_filter, None);
    }

    #[test]
    fn test_wrap_title() {
        assert_eq!(
            wrap_title("Implement responsive navigation", 12, 2),
            vec!["Implement", "responsive"]
        );
        assert_eq!(wrap_title("Update dependencies", 40, 2), vec!["Update dependencies"]);
        assert!(wrap_title("", 10, 2).is_empty());
    }

    #[test]
    fn test_render_board_and_detail() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("TEAM BOARD"));
        assert!(screen.contains("Acting as: Manager User"));
        assert!(screen.contains("Pending (4)"));

        app.selected_column = column_index(Status::Blocked);
        press(&mut app, KeyCode::Enter);
        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Task #3: Setup CI/CD pipeline"));
        assert!(screen.contains("Waiting for DevOps team"));
    }
}
