//! File-based SessionStore implementation

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use notedeck_core::{Credential, Error, Identity, Result, Session, SessionStore};

const TOKEN_FILE: &str = "token";
const USER_FILE: &str = "user.json";

/// File-based session store
///
/// Keeps two entries under a state directory: the raw bearer token in
/// `token` and the serialized identity record in `user.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    /// Directory holding the session files
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    ///
    /// # Errors
    /// - `Error::Config` if `~` is used and the home directory is unknown
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        // Expand tilde if present
        let dir = match dir.strip_prefix("~") {
            Ok(rest) => dirs::home_dir()
                .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?
                .join(rest),
            Err(_) => dir,
        };

        debug!("Initialized FileSessionStore at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            error!("Failed to read {:?}: {}", path, e);
            Err(Error::Io(e))
        }
    }
}

async fn remove_optional(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => {
            error!("Failed to remove {:?}: {}", path, e);
            Err(Error::Io(e))
        }
    }
}

/// Write a file readable only by its owner. A new file is created with mode
/// 0600 and an existing one is narrowed to 0600 before anything is written.
async fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }
    file.write_all(contents).await?;
    file.flush().await?;
    Ok(())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let token = read_optional(&self.token_path()).await?;
        let user = read_optional(&self.user_path()).await?;

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            (None, None) => return Ok(None),
            _ => {
                warn!("Found only one of token/identity in {:?}, ignoring", self.dir);
                return Ok(None);
            }
        };

        let token = Credential::new(token.trim());
        if token.is_empty() {
            warn!("Persisted token is empty, ignoring");
            return Ok(None);
        }

        let identity: Identity = serde_json::from_str(&user).map_err(|e| {
            error!("Failed to parse persisted identity: {}", e);
            Error::SessionStore(format!("Invalid identity record: {}", e))
        })?;

        debug!("Loaded persisted session for {}", identity.email);
        Ok(Some(Session::new(identity, token)))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            error!("Failed to create state directory {:?}: {}", self.dir, e);
            Error::Io(e)
        })?;

        let user = serde_json::to_string(&session.identity)?;
        tokio::fs::write(self.user_path(), user).await?;

        write_private(&self.token_path(), session.token.expose().as_bytes()).await?;

        info!("Persisted session for {}", session.identity.email);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        remove_optional(&self.token_path()).await?;
        remove_optional(&self.user_path()).await?;
        debug!("Cleared persisted session in {:?}", self.dir);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedeck_core::{Plan, Role};
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(
            Identity {
                email: "admin@acme.test".to_string(),
                role: Role::Admin,
                tenant_slug: "acme".to_string(),
                plan: None,
            },
            Credential::new("t1"),
        )
    }

    #[tokio::test]
    async fn test_empty_store_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("state")).unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("state")).unwrap();

        store.save(&session()).await.unwrap();

        let token = std::fs::read_to_string(dir.path().join("state/token")).unwrap();
        assert_eq!(token, "t1");
        let user: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("state/user.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(user["tenantSlug"], "acme");
        assert!(user.get("plan").is_none());

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, session());
    }

    #[tokio::test]
    async fn test_save_overwrites_plan() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        let mut upgraded = session();
        store.save(&upgraded).await.unwrap();
        upgraded.identity.plan = Some(Plan::Pro);
        store.save(&upgraded).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.identity.plan, Some(Plan::Pro));
    }

    #[tokio::test]
    async fn test_clear_removes_both_entries() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        store.save(&session()).await.unwrap();
        store.clear().await.unwrap();

        assert!(!dir.path().join("token").exists());
        assert!(!dir.path().join("user.json").exists());
        assert!(store.load().await.unwrap().is_none());

        // Clearing again is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_token_without_identity_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("token"), "t1").unwrap();

        let store = FileSessionStore::new(dir.path()).unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_identity_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("token"), "t1").unwrap();
        std::fs::write(dir.path().join("user.json"), "{not json").unwrap();

        let store = FileSessionStore::new(dir.path()).unwrap();
        assert!(matches!(store.load().await, Err(Error::SessionStore(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        store.save(&session()).await.unwrap();

        let mode = std::fs::metadata(dir.path().join("token"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_existing_token_file_is_narrowed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let token_path = dir.path().join("token");
        std::fs::write(&token_path, "old").unwrap();
        std::fs::set_permissions(&token_path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileSessionStore::new(dir.path()).unwrap();
        store.save(&session()).await.unwrap();

        let mode = std::fs::metadata(&token_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&token_path).unwrap(), "t1");
    }

    #[test]
    fn test_tilde_expansion() {
        if let Some(home) = dirs::home_dir() {
            let store = FileSessionStore::new("~/.notedeck").unwrap();
            assert_eq!(store.dir(), home.join(".notedeck"));
        }
    }
}
