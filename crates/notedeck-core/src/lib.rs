//! Notedeck Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Notedeck:
//! - Session identity, roles, plans and the bearer credential
//! - Note types exchanged with the notes API
//! - The entitlement gate for plan-limited note creation
//! - Gateway and session store trait abstractions
//! - Core error types

pub mod entitlement;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod note;
pub mod operation;
pub mod session_store;

pub use entitlement::{Entitlements, UpgradeAffordance, FREE_NOTE_LIMIT};
pub use error::{Error, Result};
pub use gateway::NotesGateway;
pub use identity::{AuthResponse, Credential, Credentials, Identity, Plan, Role, Session, SignupRequest};
pub use note::{Note, NoteDraft, NoteId};
pub use operation::Operation;
pub use session_store::SessionStore;
