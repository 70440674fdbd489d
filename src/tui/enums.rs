//! Enumerations for TUI state management.

/// What the board is currently showing on top of the columns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardState {
    Board,
    Detail,
    /// Picking a member to hand the selected task to.
    Assign,
    /// Typing the reason before a task is marked blocked.
    BlockReason,
    Comment,
    /// Optional link attached to the comment being written.
    CommentLink,
    /// Optional image URL attached to the comment being written.
    CommentImage,
    CreateTask,
    ConfirmDelete,
    Filter,
    Help,
}

impl BoardState {
    /// States that route keystrokes into the text input.
    pub fn takes_text(self) -> bool {
        matches!(
            self,
            BoardState::BlockReason
                | BoardState::Comment
                | BoardState::CommentLink
                | BoardState::CommentImage
        )
    }

    pub fn input_title(self) -> &'static str {
        match self {
            BoardState::BlockReason => "Blocker reason (Enter to block, Esc to cancel)",
            BoardState::Comment => "Comment (Enter for next, Esc to cancel)",
            BoardState::CommentLink => "Link, optional (Enter for next, Esc to cancel)",
            BoardState::CommentImage => "Image URL, optional (Enter to post, Esc to cancel)",
            _ => "",
        }
    }
}
