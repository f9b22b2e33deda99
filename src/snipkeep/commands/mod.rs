//! # Command Layer
//!
//! Every operation on a [`Library`](crate::model::Library) lives here as a plain
//! function: it takes the library (and arguments) and returns a [`CmdResult`].
//! A reference to a missing folder or snippet is an `Err` and leaves the
//! library untouched; the API layer turns such errors into status messages.
//!
//! Commands never persist and never reconcile the selection on their own
//! account; `api.rs` does both after each mutation.

use std::path::PathBuf;

pub mod doctor;
pub mod export;
pub mod folder;
pub mod helpers;
pub mod import;
pub mod select;
pub mod snippet;
pub mod tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == MessageLevel::Error
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Folders created, renamed, moved or removed by the command.
    pub affected_folders: Vec<String>,
    /// Snippets created, saved, moved or removed by the command.
    pub affected_snippets: Vec<String>,
    /// Files written by the command.
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_affected_folders(mut self, ids: Vec<String>) -> Self {
        self.affected_folders = ids;
        self
    }

    pub fn with_affected_snippets(mut self, ids: Vec<String>) -> Self {
        self.affected_snippets = ids;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(CmdMessage::is_error)
    }
}
