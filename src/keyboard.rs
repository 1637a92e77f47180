use std::time::{Duration, Instant};

use crate::models::Modifiers;
use crate::selection::Step;

pub const DEFAULT_TYPE_AHEAD_WINDOW: Duration = Duration::from_millis(500);

/// Keys the explorer reacts to. Letters arrive as `Char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Backspace,
    Delete,
    F2,
    F5,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Copy,
    Cut,
    Paste,
    NewFolderDialog,
    NewTab,
    CloseTab,
    SelectAll,
    DeleteDialog,
    RenameDialog,
    Refresh,
    GoUp,
    OpenSelected,
    Move { step: Step, extend: bool },
    SelectFirst,
    SelectLast,
    TypeAhead(char),
}

pub fn resolve(key: Key, modifiers: Modifiers) -> Option<KeyCommand> {
    if modifiers.command() {
        let Key::Char(ch) = key else {
            return None;
        };
        return match (ch.to_ascii_lowercase(), modifiers.shift) {
            ('c', false) => Some(KeyCommand::Copy),
            ('x', false) => Some(KeyCommand::Cut),
            ('v', false) => Some(KeyCommand::Paste),
            ('a', false) => Some(KeyCommand::SelectAll),
            ('n', true) => Some(KeyCommand::NewFolderDialog),
            ('t', false) if modifiers.ctrl => Some(KeyCommand::NewTab),
            ('w', false) if modifiers.ctrl => Some(KeyCommand::CloseTab),
            _ => None,
        };
    }

    match key {
        Key::ArrowDown => Some(KeyCommand::Move { step: Step::Down, extend: modifiers.shift }),
        Key::ArrowUp => Some(KeyCommand::Move { step: Step::Up, extend: modifiers.shift }),
        Key::Home => Some(KeyCommand::SelectFirst),
        Key::End => Some(KeyCommand::SelectLast),
        Key::Enter => Some(KeyCommand::OpenSelected),
        Key::Backspace => Some(KeyCommand::GoUp),
        Key::Delete => Some(KeyCommand::DeleteDialog),
        Key::F2 => Some(KeyCommand::RenameDialog),
        Key::F5 => Some(KeyCommand::Refresh),
        Key::Char(ch) if !modifiers.alt && !ch.is_control() => Some(KeyCommand::TypeAhead(ch)),
        Key::Char(_) => None,
    }
}

/// Accumulates typed characters into a name prefix until the user pauses for longer
/// than the window.
#[derive(Debug, Clone)]
pub struct TypeAhead {
    buffer: String,
    deadline: Option<Instant>,
    window: Duration,
}

impl Default for TypeAhead {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_AHEAD_WINDOW)
    }
}

impl TypeAhead {
    pub fn new(window: Duration) -> Self {
        Self { buffer: String::new(), deadline: None, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn prefix(&self) -> &str {
        &self.buffer
    }

    /// Returns the prefix to match after typing `ch` at `now`.
    pub fn push(&mut self, ch: char, now: Instant) -> &str {
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            self.buffer.clear();
        }
        self.buffer.extend(ch.to_lowercase());
        self.deadline = Some(now + self.window);
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.deadline = None;
    }
}
