//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Role, Status};

// Board columns and the role banner share this palette.

/// Used for Done
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used for In Progress
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for Blocked and overdue due dates
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Used for the pending backlog
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Pending => DARK_PURPLE,
        Status::Todo => Color::Blue,
        Status::InProgress => GOLD,
        Status::Done => DARK_GREEN,
        Status::Blocked => DARK_RED,
    }
}

pub fn role_color(role: Role) -> Color {
    match role {
        Role::Admin => DARK_RED,
        Role::Manager => Color::Blue,
        Role::Member => DARK_GREEN,
    }
}

/// Readable foreground on top of `bg`.
pub fn text_on(bg: Color) -> Color {
    match bg {
        GOLD => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
