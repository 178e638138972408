//! Session store trait
//!
//! The `SessionStore` trait abstracts the durable local state that survives
//! process restarts: the raw bearer token and the serialized identity record.

use async_trait::async_trait;

use crate::{Result, identity::Session};

/// Durable session persistence
///
/// Implementations:
/// - `FileSessionStore`: two files under a state directory
/// - `MemorySessionStore`: process-local, for tests and ephemeral use
///
/// # Example
/// ```no_run
/// # use notedeck_core::session_store::SessionStore;
/// # async fn example(store: &dyn SessionStore) -> notedeck_core::Result<()> {
/// if let Some(session) = store.load().await? {
///     println!("restoring {}", session.identity.email);
/// }
/// store.clear().await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted session, if both the token and identity are present
    ///
    /// # Errors
    /// - `Error::SessionStore` when the persisted identity can't be decoded
    /// - `Error::Io` for read errors
    async fn load(&self) -> Result<Option<Session>>;

    /// Persist the token and identity, replacing whatever was stored
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove both entries. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;
}
