use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions reachable from the normal (non-confirming) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveUp,
    MoveDown,
    Refresh,
    FocusWindow,
    OpenReview,
    ShowDetail,
    Delete,
    Quit,
}

impl Command {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if is_interrupt(key) {
            return Some(Command::Quit);
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Command::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::MoveDown),
            KeyCode::Char('r') => Some(Command::Refresh),
            KeyCode::Enter => Some(Command::FocusWindow),
            KeyCode::Char('o') => Some(Command::OpenReview),
            KeyCode::Char('g') => Some(Command::ShowDetail),
            KeyCode::Char('d') => Some(Command::Delete),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Ctrl+C, which quits from every mode.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Keys that accept a pending removal.
pub fn is_confirm_key(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('d') | KeyCode::Char('y'))
        && !key.modifiers.contains(KeyModifiers::CONTROL)
}
