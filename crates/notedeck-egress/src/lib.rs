//! Notedeck Egress
//!
//! This crate provides the HTTP side of the notes client:
//! - Shared reqwest client construction
//! - `HttpNotesGateway`, the `NotesGateway` implementation for the notes API
//! - Classification of responses into success, auth rejection and failure

pub mod client;
pub mod error;
pub mod gateway;

pub use client::{HttpClientConfig, build_client};
pub use error::{EgressError, Result};
pub use gateway::{DEFAULT_BACKEND_URL, HttpNotesGateway, NotesApiConfig};
