//! Application state and session transitions
//!
//! `AppState` is the explicit state the view layer renders from. The session
//! lifecycle is a two-state machine:
//!
//! ```text
//! Anonymous --login/signup success--> Authenticated --logout/401/403--> Anonymous
//! ```
//!
//! Requests are tracked with [`Ticket`]s. Every session change bumps the
//! session epoch, and every request that touches the note list bumps the list
//! generation. A completion is applied only when its epoch is current, and a
//! list fetch only when no list-affecting request was issued after it, so the
//! last *issued* request wins rather than the last one to resolve.

use std::collections::HashSet;

use notedeck_core::{
    Credential, Entitlements, Error, Identity, Note, NoteDraft, NoteId, Operation, Plan, Result,
    Session,
};

use crate::messages;

/// Which form the unauthenticated view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthForm {
    #[default]
    Login,
    Signup,
}

/// Session phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Anonymous { form: AuthForm },
    Authenticated(Session),
}

/// Authenticated views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Dashboard,
    Notes,
    Editor,
    Upgrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient, dismissable user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Explicit user logout
    Logout,
    /// The backend answered 401/403 to an authenticated call
    Expired,
}

/// Handle for one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub op: Operation,
    epoch: u64,
    generation: u64,
}

/// The whole client-side state
#[derive(Debug, Clone)]
pub struct AppState {
    phase: Phase,
    notes: Vec<Note>,
    editing: Option<NoteId>,
    draft: NoteDraft,
    section: Section,
    notice: Option<Notice>,
    busy: HashSet<Operation>,
    epoch: u64,
    list_generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: Phase::Anonymous {
                form: AuthForm::Login,
            },
            notes: Vec::new(),
            editing: None,
            draft: NoteDraft::default(),
            section: Section::Dashboard,
            notice: None,
            busy: HashSet::new(),
            epoch: 0,
            list_generation: 0,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            Phase::Authenticated(session) => Some(session),
            Phase::Anonymous { .. } => None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session().map(|s| &s.identity)
    }

    pub fn token(&self) -> Option<&Credential> {
        self.session().map(|s| &s.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn auth_form(&self) -> Option<AuthForm> {
        match self.phase {
            Phase::Anonymous { form } => Some(form),
            Phase::Authenticated(_) => None,
        }
    }

    /// Notes of the active session, in server order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    /// Id of the note in edit, if any
    pub fn editing(&self) -> Option<&NoteId> {
        self.editing.as_ref()
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_busy(&self, op: Operation) -> bool {
        self.busy.contains(&op)
    }

    /// Entitlement gate for the current session; `None` when anonymous
    pub fn entitlements(&self) -> Option<Entitlements> {
        self.identity()
            .map(|identity| Entitlements::evaluate(identity, self.notes.len(), self.editing.is_some()))
    }

    // Requests

    /// Start a request for `op`.
    ///
    /// # Errors
    /// - `Error::Busy` if the same operation is already in flight
    /// - `Error::NotAuthenticated` for authenticated operations without a session
    pub fn begin(&mut self, op: Operation) -> Result<Ticket> {
        if self.busy.contains(&op) {
            return Err(Error::Busy(op));
        }
        if op.is_authenticated() && !self.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }

        self.busy.insert(op);
        if op.touches_note_list() {
            self.list_generation += 1;
        }
        // Background reloads keep whatever the user is looking at
        if op != Operation::FetchNotes {
            self.notice = None;
        }

        Ok(Ticket {
            op,
            epoch: self.epoch,
            generation: self.list_generation,
        })
    }

    /// Whether the ticket was issued under the active session
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch
    }

    /// Release the busy flag held by `ticket`
    pub fn finish(&mut self, ticket: &Ticket) {
        if self.is_current(ticket) {
            self.busy.remove(&ticket.op);
        }
    }

    // Session transitions

    /// Anonymous/any --> Authenticated
    pub fn authenticate(&mut self, session: Session, notice: Option<Notice>) {
        self.start_epoch();
        self.phase = Phase::Authenticated(session);
        self.section = Section::Dashboard;
        self.notice = notice;
    }

    /// Authenticated/any --> Anonymous. Clears notes, editor and busy flags.
    pub fn invalidate(&mut self, reason: EndReason) {
        self.start_epoch();
        self.phase = Phase::Anonymous {
            form: AuthForm::Login,
        };
        self.section = Section::Dashboard;
        self.notice = match reason {
            EndReason::Logout => None,
            EndReason::Expired => Some(Notice::error(messages::SESSION_EXPIRED)),
        };
    }

    fn start_epoch(&mut self) {
        self.epoch += 1;
        self.notes.clear();
        self.editing = None;
        self.draft = NoteDraft::default();
        self.busy.clear();
    }

    // Completions. Each returns whether the result was applied.

    /// Replace the note list with a fetch result
    pub fn apply_notes(&mut self, ticket: &Ticket, notes: Vec<Note>) -> bool {
        if !self.is_current(ticket) || ticket.generation != self.list_generation {
            return false;
        }

        self.notes = notes;
        let edit_target_gone = self
            .editing
            .as_ref()
            .is_some_and(|id| self.note(id).is_none());
        if edit_target_gone {
            self.editing = None;
            self.draft = NoteDraft::default();
        }
        true
    }

    /// Add a created note (or refresh it if a newer fetch already brought it in)
    pub fn apply_created(&mut self, ticket: &Ticket, note: Note) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.upsert(note);
        self.draft = NoteDraft::default();
        self.section = Section::Notes;
        self.notice = Some(Notice::success(messages::NOTE_CREATED));
        true
    }

    /// Replace an updated note and leave edit mode
    pub fn apply_updated(&mut self, ticket: &Ticket, note: Note) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        if let Some(slot) = self.notes.iter_mut().find(|n| n.id == note.id) {
            *slot = note;
        }
        self.editing = None;
        self.draft = NoteDraft::default();
        self.section = Section::Notes;
        self.notice = Some(Notice::success(messages::NOTE_UPDATED));
        true
    }

    pub fn apply_deleted(&mut self, ticket: &Ticket, id: &NoteId) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.notes.retain(|n| &n.id != id);
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
            self.draft = NoteDraft::default();
        }
        self.notice = Some(Notice::success(messages::NOTE_DELETED));
        true
    }

    /// Optimistically record the PRO plan; returns the session to persist
    pub fn apply_upgrade(&mut self, ticket: &Ticket) -> Option<&Session> {
        if !self.is_current(ticket) {
            return None;
        }

        self.notice = Some(Notice::success(messages::UPGRADE_SUCCESS));
        match &mut self.phase {
            Phase::Authenticated(session) => {
                session.identity.plan = Some(Plan::Pro);
                Some(&*session)
            }
            Phase::Anonymous { .. } => None,
        }
    }

    fn upsert(&mut self, note: Note) {
        match self.notes.iter_mut().find(|n| n.id == note.id) {
            Some(slot) => *slot = note,
            None => self.notes.push(note),
        }
    }

    // Local view actions

    /// Load a note into the editor; at most one note is in edit at a time
    pub fn begin_edit(&mut self, id: &NoteId) -> Result<()> {
        let note = self
            .note(id)
            .ok_or_else(|| Error::InvalidRequest(format!("Note {} is not in the current list", id)))?;

        self.draft = NoteDraft::from(note);
        self.editing = Some(id.clone());
        self.section = Section::Editor;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft = NoteDraft::default();
        self.section = Section::Notes;
    }

    pub fn set_draft(&mut self, draft: NoteDraft) {
        self.draft = draft;
    }

    /// Switch view. Anonymous users stay on the auth form and only ADMIN
    /// users can open the upgrade screen.
    pub fn show_section(&mut self, section: Section) -> bool {
        let allowed = match (section, self.identity()) {
            (_, None) => false,
            (Section::Upgrade, Some(identity)) => identity.is_admin(),
            _ => true,
        };
        if allowed {
            self.section = section;
        }
        allowed
    }

    /// Flip between login and signup forms, dropping any notice
    pub fn toggle_auth_form(&mut self) {
        if let Phase::Anonymous { form } = &mut self.phase {
            *form = match form {
                AuthForm::Login => AuthForm::Signup,
                AuthForm::Signup => AuthForm::Login,
            };
            self.notice = None;
        }
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}
