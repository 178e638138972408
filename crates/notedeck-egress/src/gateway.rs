//! HTTP gateway for the notes API

use crate::{
    EgressError, Result,
    client::{HttpClientConfig, build_client},
};
use async_trait::async_trait;
use notedeck_core::{
    AuthResponse, Credential, Credentials, Note, NoteDraft, NoteId, NotesGateway, SignupRequest,
};
use reqwest::{Client, Url};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

/// Backend used when no base URL is configured
pub const DEFAULT_BACKEND_URL: &str = "https://notes-app-0nri.onrender.com";

/// Notes API connector configuration
#[derive(Debug, Clone)]
pub struct NotesApiConfig {
    /// Base URL of the backend, without trailing slash
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl NotesApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_config: HttpClientConfig::default(),
        }
    }

    pub fn with_client_config(mut self, client_config: HttpClientConfig) -> Self {
        self.client_config = client_config;
        self
    }
}

impl Default for NotesApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

/// `NotesGateway` backed by reqwest
pub struct HttpNotesGateway {
    config: NotesApiConfig,
    base: Url,
    client: Client,
}

impl HttpNotesGateway {
    pub fn new(config: NotesApiConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            EgressError::ConfigError(format!("Invalid backend URL '{}': {}", config.base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(EgressError::ConfigError(format!(
                "Backend URL '{}' cannot carry paths",
                config.base_url
            )));
        }

        let client = build_client(&config.client_config)?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Build an endpoint URL; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| EgressError::ConfigError("Backend URL cannot carry paths".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn fail(&self, err: EgressError) -> notedeck_core::Error {
        err.into_core(&self.config.base_url)
    }

    async fn send_json<T: DeserializeOwned + Send>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> notedeck_core::Result<T> {
        let response = request.send().await.map_err(|e| self.fail(e.into()))?;
        debug!("Response status: {}", response.status());
        response
            .handle_notes_json()
            .await
            .map_err(|e| self.fail(e))
    }

    async fn send_unit(&self, request: reqwest::RequestBuilder) -> notedeck_core::Result<()> {
        let response = request.send().await.map_err(|e| self.fail(e.into()))?;
        debug!("Response status: {}", response.status());
        response
            .handle_notes_unit()
            .await
            .map_err(|e| self.fail(e))
    }
}

#[async_trait]
impl NotesGateway for HttpNotesGateway {
    #[instrument(skip(self))]
    async fn health(&self) -> notedeck_core::Result<bool> {
        let url = self.endpoint(&["health"]).map_err(|e| self.fail(e))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.fail(e.into()))?;

        debug!("Health probe status: {}", response.status());
        Ok(response.status().is_success())
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> notedeck_core::Result<AuthResponse> {
        debug!("Sending login request");
        let url = self.endpoint(&["login"]).map_err(|e| self.fail(e))?;
        self.send_json(self.client.post(url).json(credentials)).await
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn signup(&self, request: &SignupRequest) -> notedeck_core::Result<AuthResponse> {
        debug!("Sending signup request");
        let url = self.endpoint(&["signup"]).map_err(|e| self.fail(e))?;
        self.send_json(self.client.post(url).json(request)).await
    }

    #[instrument(skip(self, token))]
    async fn list_notes(&self, token: &Credential) -> notedeck_core::Result<Vec<Note>> {
        let url = self.endpoint(&["notes"]).map_err(|e| self.fail(e))?;
        self.send_json(self.client.get(url).bearer(token)).await
    }

    #[instrument(skip(self, token, draft))]
    async fn create_note(
        &self,
        token: &Credential,
        draft: &NoteDraft,
    ) -> notedeck_core::Result<Note> {
        let url = self.endpoint(&["notes"]).map_err(|e| self.fail(e))?;
        self.send_json(self.client.post(url).bearer(token).json(draft))
            .await
    }

    #[instrument(skip(self, token, draft), fields(note_id = %id))]
    async fn update_note(
        &self,
        token: &Credential,
        id: &NoteId,
        draft: &NoteDraft,
    ) -> notedeck_core::Result<Note> {
        let url = self
            .endpoint(&["notes", id.as_str()])
            .map_err(|e| self.fail(e))?;
        self.send_json(self.client.put(url).bearer(token).json(draft))
            .await
    }

    #[instrument(skip(self, token), fields(note_id = %id))]
    async fn delete_note(&self, token: &Credential, id: &NoteId) -> notedeck_core::Result<()> {
        let url = self
            .endpoint(&["notes", id.as_str()])
            .map_err(|e| self.fail(e))?;
        self.send_unit(self.client.delete(url).bearer(token)).await
    }

    #[instrument(skip(self, token))]
    async fn upgrade_tenant(
        &self,
        token: &Credential,
        tenant_slug: &str,
    ) -> notedeck_core::Result<()> {
        let url = self
            .endpoint(&["tenants", tenant_slug, "upgrade"])
            .map_err(|e| self.fail(e))?;
        self.send_unit(self.client.post(url).bearer(token)).await
    }
}

/// Error body shape the backend uses for JSON errors
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// Helper trait for attaching the bearer credential
trait BearerAuth {
    fn bearer(self, token: &Credential) -> Self;
}

impl BearerAuth for reqwest::RequestBuilder {
    fn bearer(self, token: &Credential) -> Self {
        self.header("Authorization", token.bearer())
    }
}

// Helper trait for handling responses
#[async_trait]
trait NotesResponseHandler {
    async fn handle_notes_json<T: DeserializeOwned + Send>(self) -> Result<T>;
    async fn handle_notes_unit(self) -> Result<()>;
}

#[async_trait]
impl NotesResponseHandler for reqwest::Response {
    async fn handle_notes_json<T: DeserializeOwned + Send>(self) -> Result<T> {
        let status = self.status();
        let body = self.text().await?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), body));
        }

        serde_json::from_str::<T>(&body)
            .map_err(|e| EgressError::ParseError(format!("Failed to parse notes API response: {}", e)))
    }

    async fn handle_notes_unit(self) -> Result<()> {
        let status = self.status();
        if status.is_success() {
            return Ok(());
        }

        let body = self.text().await?;
        Err(status_error(status.as_u16(), body))
    }
}

fn status_error(status_code: u16, body: String) -> EgressError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    debug!(
        status_code,
        has_message = message.is_some(),
        "Backend rejected request"
    );

    EgressError::StatusError {
        status_code,
        message,
        body,
    }
}
