use crossterm::event::KeyEvent;

use crate::watch::Invalidation;

/// Why a full rebuild was requested without a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOrigin {
    Startup,
    Periodic,
}

/// Everything the interaction engine reacts to, delivered over one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Resize { width: u16, height: u16 },
    Key(KeyEvent),
    Refresh(RefreshOrigin),
    Invalidate(Invalidation),
}
