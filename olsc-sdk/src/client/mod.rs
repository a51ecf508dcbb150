//! Typed HTTP client for the live-score API.
//!
//! Gated behind the `client` cargo feature so downstream crates that
//! only need the shared types do not pull in `reqwest` and the
//! WebSocket stack.

mod subscription;

pub use subscription::{LiveSubscriber, Subscription, POLL_INTERVAL};

use reqwest::{Client, StatusCode};
use url::Url;

use crate::objects::{ClockCommand, ClockSnapshot, MatchEvent, MatchStats, StoredMatchEvent};

/// Errors produced by the SDK client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The WebSocket connection failed or errored mid-stream.
    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    /// The base URL uses a scheme the live stream cannot be derived from.
    #[error("unsupported url scheme: {0}")]
    Scheme(String),
}

/// Typed HTTP client for the clock, feed and stats APIs.
#[derive(Debug, Clone)]
pub struct LiveScoreClient {
    http: Client,
    base_url: Url,
}

impl LiveScoreClient {
    /// Create a new client against the server's root URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /api/v1/clock/{match_id}/start` – start or resume the clock.
    pub async fn start_clock(&self, match_id: &str) -> Result<ClockSnapshot, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/clock/{match_id}/start"))?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /api/v1/clock/{match_id}/pause` – pause with an optional reason.
    pub async fn pause_clock(
        &self,
        match_id: &str,
        reason: Option<String>,
    ) -> Result<ClockSnapshot, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/clock/{match_id}/pause"))?;
        let resp = self
            .http
            .post(url)
            .json(&ClockCommand { reason })
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /api/v1/clock/{match_id}/finish` – stop the clock terminally.
    pub async fn finish_clock(
        &self,
        match_id: &str,
        reason: Option<String>,
    ) -> Result<ClockSnapshot, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/clock/{match_id}/finish"))?;
        let resp = self
            .http
            .post(url)
            .json(&ClockCommand { reason })
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/clock/{match_id}` – read the current snapshot.
    ///
    /// Never fails with 404; a match without a clock yields the
    /// zero-value snapshot.
    pub async fn clock(&self, match_id: &str) -> Result<ClockSnapshot, ClientError> {
        let url = self.base_url.join(&format!("/api/v1/clock/{match_id}"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `DELETE /api/v1/clock/{match_id}` – administrative clock reset.
    pub async fn reset_clock(&self, match_id: &str) -> Result<(), ClientError> {
        let url = self.base_url.join(&format!("/api/v1/clock/{match_id}"))?;
        let resp = self.http.delete(url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ClientError::Api { status, body })
        }
    }

    /// `POST /api/v1/feed/{match_id}/start` – initialize the event log.
    pub async fn start_feed(&self, match_id: &str) -> Result<MatchStats, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/feed/{match_id}/start"))?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /api/v1/feed/{match_id}` – append an event to the log.
    pub async fn append_event(
        &self,
        match_id: &str,
        event: &MatchEvent,
    ) -> Result<StoredMatchEvent, ClientError> {
        let url = self.base_url.join(&format!("/api/v1/feed/{match_id}"))?;
        let resp = self.http.post(url).json(event).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/stats/{match_id}` – aggregated stats plus raw events.
    pub async fn stats(&self, match_id: &str) -> Result<MatchStats, ClientError> {
        let url = self.base_url.join(&format!("/api/v1/stats/{match_id}"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// Subscribe to live updates for one match.
    ///
    /// Spawns a background delivery task that pushes every full-state
    /// change into `on_change`. See [`Subscription`] for the teardown
    /// contract.
    pub fn subscribe<F>(&self, match_id: &str, on_change: F) -> Result<Subscription, ClientError>
    where
        F: Fn(crate::objects::MatchStateSnapshot) + Send + Sync + 'static,
    {
        subscription::spawn(self.clone(), &self.base_url, match_id, on_change)
    }
}

/// Parse a JSON response body, mapping non-2xx statuses to
/// [`ClientError::Api`].
async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}
