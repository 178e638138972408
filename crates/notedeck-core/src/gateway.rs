//! Gateway trait for the remote notes API
//!
//! The `NotesGateway` trait abstracts over the HTTP contract of the backend so
//! the session manager can be driven by the real client or by a test double.

use async_trait::async_trait;

use crate::{
    Result,
    identity::{AuthResponse, Credential, Credentials, SignupRequest},
    note::{Note, NoteDraft, NoteId},
};

/// Notes API gateway
///
/// Every method performs exactly one request; nothing is retried.
///
/// Failures map onto [`crate::Error`]:
/// - `Error::Transport` when no response arrived
/// - `Error::Status` for non-2xx responses (401/403 report `is_auth_rejection()`)
/// - `Error::InvalidResponse` when a 2xx body doesn't parse
#[async_trait]
pub trait NotesGateway: Send + Sync {
    /// Connectivity probe (`GET /health`)
    ///
    /// Returns whether the backend answered with a success status.
    async fn health(&self) -> Result<bool>;

    /// `POST /login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;

    /// `POST /signup`
    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse>;

    /// `GET /notes`
    async fn list_notes(&self, token: &Credential) -> Result<Vec<Note>>;

    /// `POST /notes`
    async fn create_note(&self, token: &Credential, draft: &NoteDraft) -> Result<Note>;

    /// `PUT /notes/:id`
    async fn update_note(&self, token: &Credential, id: &NoteId, draft: &NoteDraft)
        -> Result<Note>;

    /// `DELETE /notes/:id`
    async fn delete_note(&self, token: &Credential, id: &NoteId) -> Result<()>;

    /// `POST /tenants/:slug/upgrade`
    async fn upgrade_tenant(&self, token: &Credential, tenant_slug: &str) -> Result<()>;
}
