//! API-key validation for the numerology endpoint.
//!
//! Keys live in a JSON file mapping each key to an entry with a `status`
//! field; only keys whose status is `active` are admitted. The file is
//! re-read on every request so keys can be added or revoked without a
//! restart. A missing or unreadable file simply means no key is valid.

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ServerError;

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Lifecycle state of an API key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// The key is valid and admitted.
    Active,
    /// Any non-active status (revoked, suspended, unknown labels).
    #[serde(other)]
    Inactive,
}

/// A single key entry from the key file.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyEntry {
    /// Lifecycle state of the key.
    pub status: KeyStatus,
}

/// Source of API-key entries.
///
/// The server is generic over its store so tests and embedders can supply
/// an in-memory implementation instead of the JSON file.
#[async_trait]
pub trait ApiKeyStore: Send + Sync + Clone + 'static {
    /// Look up a key, returning its entry if the key is known.
    async fn lookup(&self, key: &str) -> Option<ApiKeyEntry>;
}

/// Key store backed by a JSON file of the form
/// `{"<key>": {"status": "active"}, ...}`.
#[derive(Debug, Clone)]
pub struct JsonFileKeyStore {
    path: Arc<PathBuf>,
}

impl JsonFileKeyStore {
    /// Create a store reading from the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    /// Path of the backing key file.
    pub fn path(&self) -> &std::path::Path {
        self.path.as_ref()
    }

    async fn load(&self) -> HashMap<String, ApiKeyEntry> {
        let bytes = match tokio::fs::read(self.path.as_ref()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("API key file {} not readable: {}", self.path.display(), e);
                return HashMap::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("API key file {} is malformed: {}", self.path.display(), e);
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl ApiKeyStore for JsonFileKeyStore {
    async fn lookup(&self, key: &str) -> Option<ApiKeyEntry> {
        self.load().await.remove(key)
    }
}

/// Middleware gating a route behind the API-key header.
///
/// A missing header yields 401 and an unknown or non-active key yields 403,
/// both with the standard JSON error body.
pub async fn api_key_middleware<S: ApiKeyStore>(
    State(store): State<S>,
    req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let Some(key) = header else {
        log::warn!("Request to {} rejected: API key header missing", req.uri());
        let err = ServerError::MissingApiKey;
        return (err.status_code(), err.body()).into_response();
    };

    match store.lookup(key).await {
        Some(entry) if entry.status == KeyStatus::Active => next.run(req).await,
        _ => {
            log::warn!("Request to {} rejected: invalid or inactive API key", req.uri());
            let err = ServerError::ForbiddenApiKey;
            (err.status_code(), err.body()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn key_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn active_key_is_found() {
        let file = key_file(r#"{"secret-key": {"status": "active"}}"#);
        let store = JsonFileKeyStore::new(file.path());

        let entry = store.lookup("secret-key").await.unwrap();
        assert_eq!(entry.status, KeyStatus::Active);
    }

    #[tokio::test]
    async fn unknown_key_is_absent() {
        let file = key_file(r#"{"secret-key": {"status": "active"}}"#);
        let store = JsonFileKeyStore::new(file.path());

        assert!(store.lookup("other-key").await.is_none());
    }

    #[tokio::test]
    async fn non_active_statuses_deserialize_as_inactive() {
        let file = key_file(r#"{"old-key": {"status": "revoked"}}"#);
        let store = JsonFileKeyStore::new(file.path());

        let entry = store.lookup("old-key").await.unwrap();
        assert_eq!(entry.status, KeyStatus::Inactive);
    }

    #[tokio::test]
    async fn missing_file_yields_no_keys() {
        let store = JsonFileKeyStore::new("/nonexistent/api_keys.json");
        assert!(store.lookup("secret-key").await.is_none());
    }

    #[tokio::test]
    async fn malformed_file_yields_no_keys() {
        let file = key_file("not json at all");
        let store = JsonFileKeyStore::new(file.path());

        assert!(store.lookup("secret-key").await.is_none());
    }

    #[tokio::test]
    async fn key_file_is_reread_on_every_lookup() {
        let file = key_file(r#"{}"#);
        let store = JsonFileKeyStore::new(file.path());
        assert!(store.lookup("late-key").await.is_none());

        std::fs::write(file.path(), r#"{"late-key": {"status": "active"}}"#).unwrap();
        assert!(store.lookup("late-key").await.is_some());
    }
}
