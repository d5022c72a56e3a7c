//! Messages driving the update loop.

/// Every user action the interactive loop understands. Dispatched from
/// key events and consumed by `App::update()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Quit the application (success exit)
    Quit,

    // Navigation
    MoveUp,
    MoveDown,
    GotoTop,
    GotoBottom,

    /// Toggle multi-select on the highlighted row
    ToggleSelect,
    /// Toggle the preview split for the highlighted row
    TogglePreview,

    // Actions (trigger a reload when they change remote state)
    Reload,
    MarkRead,
    MarkDone,
    OpenBrowser,

    // Live query
    EnterSearch,
    ExitSearch,
    ConfirmSearch,
    SearchInput(char),
    SearchBackspace,

    // Comment flow (posts, then exits)
    EnterComment,
    CancelComment,
    CommentInput(char),
    CommentBackspace,
    SubmitComment,

    /// Toggle the help overlay
    ToggleHelp,

    /// No operation (unhandled key)
    None,
}
