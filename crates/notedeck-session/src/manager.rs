//! Session manager
//!
//! `SessionManager` sequences gateway calls against [`AppState`] and keeps
//! the session store in step with the in-memory session. Every operation
//! records its user-visible outcome as a notice and also returns it as a
//! `Result`, so both an interactive view and a one-shot CLI can drive it.
//!
//! Operations take `&mut self` across their await point, so one manager
//! runs one request at a time. A view layer that overlaps requests drives
//! [`AppState::begin`] and the `apply_*` completions directly; the ticket
//! checks there are what keep overlapping results ordered.

use std::sync::Arc;
use tracing::{debug, info, warn};

use notedeck_core::{
    Credential, Credentials, Error, Note, NoteDraft, NoteId, NotesGateway, Operation, Result,
    Session, SessionStore, SignupRequest,
};

use crate::messages;
use crate::state::{AppState, EndReason, Notice, Section, Ticket};

pub struct SessionManager<G: NotesGateway + ?Sized, S: SessionStore> {
    gateway: Arc<G>,
    store: S,
    state: AppState,
}

impl<G, S> SessionManager<G, S>
where
    G: NotesGateway + ?Sized,
    S: SessionStore,
{
    pub fn new(gateway: Arc<G>, store: S) -> Self {
        Self {
            gateway,
            store,
            state: AppState::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Adopt a persisted session, if any, and fetch its notes.
    ///
    /// The token is trusted as-is; the first authenticated call decides
    /// whether it is still good. A persisted identity that can't be decoded
    /// is discarded. Returns whether a session is active afterwards.
    pub async fn restore(&mut self) -> Result<bool> {
        let session = match self.store.load().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("No persisted session");
                return Ok(false);
            }
            Err(Error::SessionStore(reason)) => {
                warn!("Discarding unreadable persisted session: {}", reason);
                if let Err(e) = self.store.clear().await {
                    warn!("Failed to clear session store: {}", e);
                }
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        info!("Restored session for {}", session.identity.email);
        self.state.authenticate(session, None);
        if let Err(e) = self.refresh_notes().await {
            debug!("Initial note fetch after restore failed: {}", e);
        }
        Ok(self.state.is_authenticated())
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let ticket = self.state.begin(Operation::Login)?;
        let credentials = Credentials::new(email, password);
        let result = self.gateway.login(&credentials).await;
        self.adopt_auth_response(&ticket, result.map(Session::from), messages::LOGIN_SUCCESS)
            .await
    }

    pub async fn signup(&mut self, email: &str, password: &str, tenant_name: &str) -> Result<()> {
        let ticket = self.state.begin(Operation::Signup)?;
        let request = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            tenant_name: tenant_name.to_string(),
        };
        let result = self.gateway.signup(&request).await;
        self.adopt_auth_response(&ticket, result.map(Session::from), messages::SIGNUP_SUCCESS)
            .await
    }

    async fn adopt_auth_response(
        &mut self,
        ticket: &Ticket,
        result: Result<Session>,
        success: &str,
    ) -> Result<()> {
        let session = match result {
            Ok(session) if session.token.is_empty() => {
                let err = Error::InvalidResponse("response carried an empty token".to_string());
                return Err(self.fail(ticket, err).await);
            }
            Ok(session) => session,
            Err(e) => return Err(self.fail(ticket, e).await),
        };

        self.state.finish(ticket);
        if !self.state.is_current(ticket) {
            debug!("Dropping {} result from a superseded session", ticket.op);
            return Ok(());
        }

        info!(
            "Authenticated {} ({}) in tenant {}",
            session.identity.email, session.identity.role, session.identity.tenant_slug
        );
        self.persist(&session).await;
        self.state.authenticate(session, Some(Notice::success(success)));

        if let Err(e) = self.refresh_notes().await {
            debug!("Initial note fetch failed: {}", e);
        }
        Ok(())
    }

    /// Explicit sign-out
    pub async fn logout(&mut self) {
        self.invalidate(EndReason::Logout).await;
    }

    /// End the active session: clear persistence and return to the login form.
    ///
    /// A store failure is logged; the in-memory session is cleared regardless.
    pub async fn invalidate(&mut self, reason: EndReason) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear session store: {}", e);
        }
        self.state.invalidate(reason);
        info!("Session ended ({:?})", reason);
    }

    pub async fn refresh_notes(&mut self) -> Result<()> {
        let (ticket, token) = self.begin_authenticated(Operation::FetchNotes)?;
        match self.gateway.list_notes(&token).await {
            Ok(notes) => {
                self.state.finish(&ticket);
                let count = notes.len();
                if self.state.apply_notes(&ticket, notes) {
                    debug!("Loaded {} notes", count);
                } else {
                    debug!("Discarding superseded note list");
                }
                Ok(())
            }
            Err(e) => Err(self.fail(&ticket, e).await),
        }
    }

    /// Create a note without consulting the entitlement gate.
    ///
    /// The backend alone decides whether this succeeds.
    pub async fn create_note(&mut self, draft: NoteDraft) -> Result<Note> {
        let (ticket, token) = self.begin_authenticated(Operation::CreateNote)?;
        match self.gateway.create_note(&token, &draft).await {
            Ok(note) => {
                self.state.finish(&ticket);
                self.state.apply_created(&ticket, note.clone());
                info!("Created note {}", note.id);
                Ok(note)
            }
            Err(e) => Err(self.fail(&ticket, e).await),
        }
    }

    pub async fn update_note(&mut self, id: &NoteId, draft: NoteDraft) -> Result<Note> {
        let (ticket, token) = self.begin_authenticated(Operation::UpdateNote)?;
        match self.gateway.update_note(&token, id, &draft).await {
            Ok(note) => {
                self.state.finish(&ticket);
                self.state.apply_updated(&ticket, note.clone());
                info!("Updated note {}", note.id);
                Ok(note)
            }
            Err(e) => Err(self.fail(&ticket, e).await),
        }
    }

    pub async fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        let (ticket, token) = self.begin_authenticated(Operation::DeleteNote)?;
        match self.gateway.delete_note(&token, id).await {
            Ok(()) => {
                self.state.finish(&ticket);
                self.state.apply_deleted(&ticket, id);
                info!("Deleted note {}", id);
                Ok(())
            }
            Err(e) => Err(self.fail(&ticket, e).await),
        }
    }

    /// Submit the editor: update the note in edit, or create a new one.
    ///
    /// Creation honours the entitlement gate; editing never does.
    pub async fn submit_draft(&mut self) -> Result<Note> {
        let draft = self.state.draft().clone();
        if let Some(id) = self.state.editing().cloned() {
            return self.update_note(&id, draft).await;
        }

        let blocked = self
            .state
            .entitlements()
            .is_some_and(|gate| gate.limit_reached);
        if blocked {
            self.state
                .set_notice(Notice::error(messages::NOTE_LIMIT_REACHED));
            return Err(Error::InvalidRequest(messages::NOTE_LIMIT_REACHED.to_string()));
        }
        self.create_note(draft).await
    }

    /// Ask the backend to move the tenant to PRO.
    ///
    /// On success the local plan is set to PRO and persisted without asking
    /// the backend to confirm, then the notes are re-fetched.
    pub async fn upgrade_plan(&mut self) -> Result<()> {
        let (ticket, token) = self.begin_authenticated(Operation::Upgrade)?;
        let tenant_slug = match self.state.identity() {
            Some(identity) => identity.tenant_slug.clone(),
            None => return Err(self.fail(&ticket, Error::NotAuthenticated).await),
        };

        if let Err(e) = self.gateway.upgrade_tenant(&token, &tenant_slug).await {
            return Err(self.fail(&ticket, e).await);
        }

        self.state.finish(&ticket);
        let upgraded = self.state.apply_upgrade(&ticket).cloned();
        let Some(session) = upgraded else {
            debug!("Dropping upgrade result from a superseded session");
            return Ok(());
        };
        info!("Tenant {} upgraded to PRO", tenant_slug);
        self.persist(&session).await;

        if let Err(e) = self.refresh_notes().await {
            debug!("Note fetch after upgrade failed: {}", e);
        }
        Ok(())
    }

    /// Probe backend connectivity
    pub async fn probe_health(&mut self) -> Result<bool> {
        let ticket = self.state.begin(Operation::Health)?;
        match self.gateway.health().await {
            Ok(healthy) => {
                self.state.finish(&ticket);
                debug!("Health probe answered healthy={}", healthy);
                Ok(healthy)
            }
            Err(e) => Err(self.fail(&ticket, e).await),
        }
    }

    // Local view actions

    pub fn begin_edit(&mut self, id: &NoteId) -> Result<()> {
        self.state.begin_edit(id)
    }

    pub fn cancel_edit(&mut self) {
        self.state.cancel_edit();
    }

    pub fn set_draft(&mut self, draft: NoteDraft) {
        self.state.set_draft(draft);
    }

    pub fn show_section(&mut self, section: Section) -> bool {
        self.state.show_section(section)
    }

    pub fn toggle_auth_form(&mut self) {
        self.state.toggle_auth_form();
    }

    pub fn dismiss_notice(&mut self) {
        self.state.dismiss_notice();
    }

    fn begin_authenticated(&mut self, op: Operation) -> Result<(Ticket, Credential)> {
        let Some(token) = self.state.token().cloned() else {
            self.state
                .set_notice(Notice::error(messages::NOT_AUTHENTICATED));
            return Err(Error::NotAuthenticated);
        };
        let ticket = self.state.begin(op)?;
        Ok((ticket, token))
    }

    /// Common failure path: release the ticket, then either end the session
    /// (auth rejection on an authenticated call) or surface a notice.
    async fn fail(&mut self, ticket: &Ticket, err: Error) -> Error {
        self.state.finish(ticket);
        if !self.state.is_current(ticket) {
            debug!("Dropping {} failure from a superseded session: {}", ticket.op, err);
            return err;
        }

        if ticket.op.is_authenticated() && err.is_auth_rejection() {
            warn!("{} rejected by backend, ending session: {}", ticket.op, err);
            self.invalidate(EndReason::Expired).await;
        } else {
            warn!("{} failed: {}", ticket.op, err);
            self.state
                .set_notice(Notice::error(messages::failure(ticket.op, &err)));
        }
        err
    }

    async fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save(session).await {
            warn!("Failed to persist session: {}", e);
        }
    }
}
