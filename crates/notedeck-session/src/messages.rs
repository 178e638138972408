//! User-facing notice text

use notedeck_core::{Error, Operation};

pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const SIGNUP_SUCCESS: &str = "Signup successful! Welcome to Notes App.";
pub const NOTE_CREATED: &str = "Note created successfully!";
pub const NOTE_UPDATED: &str = "Note updated successfully!";
pub const NOTE_DELETED: &str = "Note deleted successfully!";
pub const UPGRADE_SUCCESS: &str = "Successfully upgraded to PRO plan!";
pub const INVALID_RESPONSE: &str = "Received invalid response from server";
pub const NOT_AUTHENTICATED: &str = "No authentication token found. Please log in again.";
pub const NOTE_LIMIT_REACHED: &str = "You've reached the note limit for the FREE plan.";

/// Raw bodies (often HTML error pages) are cut to this many characters
const MAX_BODY_CHARS: usize = 200;

pub fn network_error(backend_url: &str) -> String {
    format!(
        "Network error. Please check your connection and make sure the backend server is running at {}",
        backend_url
    )
}

/// Notice text for a failed operation.
///
/// Auth rejections on authenticated calls never reach here; they end the
/// session with [`SESSION_EXPIRED`] instead.
pub fn failure(op: Operation, err: &Error) -> String {
    match err {
        Error::Transport { backend_url, .. } => network_error(backend_url),
        Error::Status {
            status,
            message,
            body,
        } => {
            if let Some(message) = message {
                return message.clone();
            }
            let body = body.trim();
            if body.is_empty() {
                format!("{} ({})", op.failure_label(), status)
            } else {
                format!("{} ({}): {}", op.failure_label(), status, truncate(body))
            }
        }
        Error::InvalidResponse(_) => INVALID_RESPONSE.to_string(),
        Error::NotAuthenticated => NOT_AUTHENTICATED.to_string(),
        Error::Busy(_) => format!("{}: a previous request is still in progress", op.failure_label()),
        other => format!("An error occurred: {}", other),
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}
