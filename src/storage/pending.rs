use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use url::Url;

use crate::download::formats::QualityOption;

/// Opaque token tying a keyboard to its pending request
///
/// Generated from a random UUID (simple form, 32 hex chars) so it fits in
/// callback data next to a format id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestToken(String);

impl RequestToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A link waiting for the user to pick a quality
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub url: Url,
    pub chat_id: i64,
    pub title: String,
    pub options: Vec<QualityOption>,
    pub created_at: Instant,
    /// A download for this request is running right now
    pub in_flight: bool,
}

impl PendingRequest {
    pub fn option(&self, format_id: &str) -> Option<&QualityOption> {
        self.options.iter().find(|o| o.format_id == format_id)
    }
}

/// Why a download could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginError {
    /// Unknown token: cancelled, cleaned up or from before a restart
    Expired,
    /// Another button of the same keyboard is already downloading
    Busy,
}

/// In-memory registry of pending requests
///
/// Lives for the process lifetime; a restart forgets all keyboards, which
/// then answer "Request expired.".
#[derive(Default)]
pub struct PendingRequests {
    entries: Mutex<HashMap<RequestToken, PendingRequest>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request and returns its fresh token
    pub async fn insert(&self, url: Url, chat_id: i64, title: String, options: Vec<QualityOption>) -> RequestToken {
        let token = RequestToken::generate();
        let request = PendingRequest {
            url,
            chat_id,
            title,
            options,
            created_at: Instant::now(),
            in_flight: false,
        };
        self.entries.lock().await.insert(token.clone(), request);
        token
    }

    pub async fn get(&self, token: &RequestToken) -> Option<PendingRequest> {
        self.entries.lock().await.get(token).cloned()
    }

    pub async fn remove(&self, token: &RequestToken) -> Option<PendingRequest> {
        self.entries.lock().await.remove(token)
    }

    /// Marks the request as downloading and returns a snapshot of it
    pub async fn begin(&self, token: &RequestToken) -> Result<PendingRequest, BeginError> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(token).ok_or(BeginError::Expired)?;
        if entry.in_flight {
            return Err(BeginError::Busy);
        }
        entry.in_flight = true;
        Ok(entry.clone())
    }

    /// Clears the in-flight flag; no-op for unknown tokens
    pub async fn finish(&self, token: &RequestToken) {
        if let Some(entry) = self.entries.lock().await.get_mut(token) {
            entry.in_flight = false;
        }
    }

    /// Removes the request unless a download for it is running
    pub async fn remove_if_idle(&self, token: &RequestToken) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get(token) {
            Some(entry) if !entry.in_flight => {
                entries.remove(token);
                true
            }
            _ => false,
        }
    }

    /// Drops idle requests older than `ttl`, returns how many were removed
    pub async fn purge_expired(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.in_flight || entry.created_at.elapsed() < ttl);
        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("Purged {} expired pending requests", removed);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://youtu.be/abc").unwrap()
    }

    fn option(id: &str) -> QualityOption {
        QualityOption {
            height: 720,
            actual_height: 720,
            format_id: id.to_string(),
            size_bytes: None,
            size_is_exact: false,
            has_audio: true,
        }
    }

    #[test]
    fn test_tokens_are_unique_and_compact() {
        let a = RequestToken::generate();
        let b = RequestToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let pending = PendingRequests::new();
        let token = pending.insert(url(), 42, "Clip".into(), vec![option("22")]).await;

        let request = pending.get(&token).await.unwrap();
        assert_eq!(request.chat_id, 42);
        assert_eq!(request.option("22").map(|o| o.height), Some(720));
        assert!(request.option("18").is_none());

        assert!(pending.remove(&token).await.is_some());
        assert!(pending.get(&token).await.is_none());
        assert!(pending.is_empty().await);
    }

    #[tokio::test]
    async fn test_begin_unknown_token_is_expired() {
        let pending = PendingRequests::new();
        let err = pending.begin(&RequestToken::from("nope")).await.unwrap_err();
        assert_eq!(err, BeginError::Expired);
    }

    #[tokio::test]
    async fn test_begin_twice_is_busy_until_finish() {
        let pending = PendingRequests::new();
        let token = pending.insert(url(), 1, "Clip".into(), vec![]).await;

        assert!(pending.begin(&token).await.is_ok());
        assert_eq!(pending.begin(&token).await.unwrap_err(), BeginError::Busy);

        pending.finish(&token).await;
        assert!(pending.begin(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_if_idle_keeps_running_requests() {
        let pending = PendingRequests::new();
        let token = pending.insert(url(), 1, "Clip".into(), vec![]).await;
        pending.begin(&token).await.unwrap();

        assert!(!pending.remove_if_idle(&token).await);
        assert_eq!(pending.len().await, 1);

        pending.finish(&token).await;
        assert!(pending.remove_if_idle(&token).await);
        assert_eq!(pending.len().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired_skips_in_flight() {
        let pending = PendingRequests::new();
        let idle = pending.insert(url(), 1, "a".into(), vec![]).await;
        let busy = pending.insert(url(), 2, "b".into(), vec![]).await;
        pending.begin(&busy).await.unwrap();

        assert_eq!(pending.purge_expired(Duration::from_secs(3600)).await, 0);
        assert_eq!(pending.purge_expired(Duration::ZERO).await, 1);
        assert!(pending.get(&idle).await.is_none());
        assert!(pending.get(&busy).await.is_some());
    }
}
