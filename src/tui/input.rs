//! Mode-based key dispatch: every key event becomes a [`Message`].
//!
//! The active mode (live query, comment overlay, help overlay, or the
//! plain table) picks the mapping; all state changes happen in
//! `App::update()`, never here.

use super::{App, Message, Overlay};
use crossterm::event::{KeyCode, KeyEvent};
pub fn dispatch(app: &App, key: KeyEvent) -> Message {
    if app.search_mode {
        dispatch_search_mode(key)
    } else {
        match app.overlay {
            Overlay::Comment => dispatch_comment_overlay(key),
            Overlay::Help => dispatch_help_overlay(key),
            Overlay::None => dispatch_normal_mode(key),
        }
    }
}

/// Handle keys in normal mode (the notification table).
fn dispatch_normal_mode(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Message::Quit,
        KeyCode::Char('j') | KeyCode::Down => Message::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Message::MoveUp,
        KeyCode::Char('g') => Message::GotoTop,
        KeyCode::Char('G') => Message::GotoBottom,
        KeyCode::Tab => Message::ToggleSelect,
        KeyCode::Char('p') => Message::TogglePreview,
        KeyCode::Char('r') => Message::Reload,
        KeyCode::Char('m') => Message::MarkRead,
        KeyCode::Char('d') => Message::MarkDone,
        KeyCode::Char('o') | KeyCode::Enter => Message::OpenBrowser,
        KeyCode::Char('c') => Message::EnterComment,
        KeyCode::Char('/') => Message::EnterSearch,
        KeyCode::Char('?') => Message::ToggleHelp,
        _ => Message::None,
    }
}

/// Handle keys while typing the live query.
fn dispatch_search_mode(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc => Message::ExitSearch,
        KeyCode::Enter => Message::ConfirmSearch,
        KeyCode::Backspace => Message::SearchBackspace,
        KeyCode::Char(c) => Message::SearchInput(c),
        _ => Message::None,
    }
}

/// Handle keys while composing a comment.
fn dispatch_comment_overlay(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc => Message::CancelComment,
        KeyCode::Enter => Message::SubmitComment,
        KeyCode::Backspace => Message::CommentBackspace,
        KeyCode::Char(c) => Message::CommentInput(c),
        _ => Message::None,
    }
}

fn dispatch_help_overlay(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Message::ToggleHelp,
        _ => Message::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn test_normal_mode_quit() {
        assert_eq!(
            dispatch_normal_mode(key_event(KeyCode::Char('q'))),
            Message::Quit
        );
        assert_eq!(dispatch_normal_mode(key_event(KeyCode::Esc)), Message::Quit);
    }

    #[test]
    fn test_normal_mode_navigation() {
        assert_eq!(
            dispatch_normal_mode(key_event(KeyCode::Char('j'))),
            Message::MoveDown
        );
        assert_eq!(
            dispatch_normal_mode(key_event(KeyCode::Char('k'))),
            Message::MoveUp
        );
        assert_eq!(
            dispatch_normal_mode(key_event(KeyCode::Char('G'))),
            Message::GotoBottom
        );
    }

    #[test]
    fn test_normal_mode_actions() {
        assert_eq!(
            dispatch_normal_mode(key_event(KeyCode::Char('m'))),
            Message::MarkRead
        );
        assert_eq!(
            dispatch_normal_mode(key_event(KeyCode::Char('d'))),
            Message::MarkDone
        );
        assert_eq!(
            dispatch_normal_mode(key_event(KeyCode::Tab)),
            Message::ToggleSelect
        );
    }

    #[test]
    fn test_search_mode() {
        assert_eq!(
            dispatch_search_mode(key_event(KeyCode::Esc)),
            Message::ExitSearch
        );
        assert_eq!(
            dispatch_search_mode(key_event(KeyCode::Enter)),
            Message::ConfirmSearch
        );
        assert_eq!(
            dispatch_search_mode(key_event(KeyCode::Char('a'))),
            Message::SearchInput('a')
        );
    }

    #[test]
    fn test_comment_overlay() {
        assert_eq!(
            dispatch_comment_overlay(key_event(KeyCode::Enter)),
            Message::SubmitComment
        );
        assert_eq!(
            dispatch_comment_overlay(key_event(KeyCode::Esc)),
            Message::CancelComment
        );
    }
}
