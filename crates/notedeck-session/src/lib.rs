//! Session management for the Notedeck client
//!
//! This crate owns the single process-wide authentication state:
//! - `AppState`: session phase, note list, editor, notices and request tickets
//! - `SessionManager`: drives the notes gateway and keeps state and persistence in step
//! - Session stores: file-backed persistence and an in-memory variant
//!
//! # Example
//! ```no_run
//! # use std::sync::Arc;
//! # use notedeck_core::NotesGateway;
//! # use notedeck_session::{FileSessionStore, SessionManager};
//! # async fn example(gateway: Arc<dyn NotesGateway>) -> notedeck_core::Result<()> {
//! let store = FileSessionStore::new("~/.notedeck")?;
//! let mut manager = SessionManager::new(gateway, store);
//! if !manager.restore().await? {
//!     manager.login("admin@acme.test", "password").await?;
//! }
//! println!("{} notes", manager.state().notes().len());
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod messages;
pub mod state;
pub mod store;

pub use manager::SessionManager;
pub use state::{AppState, AuthForm, EndReason, Notice, NoticeKind, Phase, Section, Ticket};
pub use store::{FileSessionStore, MemorySessionStore};
