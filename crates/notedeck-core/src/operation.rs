//! User-triggered operations against the notes API

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single kind of user action that talks to the backend.
///
/// Each operation carries its own busy flag, so two submissions of the same
/// operation cannot overlap while different operations may.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Health,
    Login,
    Signup,
    FetchNotes,
    CreateNote,
    UpdateNote,
    DeleteNote,
    Upgrade,
}

impl Operation {
    /// Whether the operation sends the bearer credential.
    pub fn is_authenticated(self) -> bool {
        matches!(
            self,
            Operation::FetchNotes
                | Operation::CreateNote
                | Operation::UpdateNote
                | Operation::DeleteNote
                | Operation::Upgrade
        )
    }

    /// Whether the operation changes or reloads the in-memory note list.
    pub fn touches_note_list(self) -> bool {
        matches!(
            self,
            Operation::FetchNotes
                | Operation::CreateNote
                | Operation::UpdateNote
                | Operation::DeleteNote
        )
    }

    /// Prefix used when a failure carries no server-provided message.
    pub fn failure_label(self) -> &'static str {
        match self {
            Operation::Health => "Health check failed",
            Operation::Login => "Login failed",
            Operation::Signup => "Signup failed",
            Operation::FetchNotes => "Failed to fetch notes",
            Operation::CreateNote => "Failed to create note",
            Operation::UpdateNote => "Failed to update note",
            Operation::DeleteNote => "Failed to delete note",
            Operation::Upgrade => "Failed to upgrade",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Health => "health",
            Operation::Login => "login",
            Operation::Signup => "signup",
            Operation::FetchNotes => "fetch_notes",
            Operation::CreateNote => "create_note",
            Operation::UpdateNote => "update_note",
            Operation::DeleteNote => "delete_note",
            Operation::Upgrade => "upgrade",
        };
        f.write_str(name)
    }
}
