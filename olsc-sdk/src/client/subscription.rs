//! Live match subscription with push delivery and polling fallback.
//!
//! Each subscription runs one background task. The task prefers the
//! WebSocket push stream; when the stream cannot be established or
//! errors out it degrades to fixed-interval polling of the clock and
//! stats endpoints, then periodically re-attempts push. Poll failures
//! are logged and never tear the subscription down.
//!
//! Teardown is explicit: [`Subscription::close`] (or dropping the
//! handle) aborts the task, so no timer or task outlives the handle.

use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use super::{ClientError, LiveScoreClient};
use crate::objects::{MatchStateSnapshot, WsServerMessage};

/// Interval between fallback polls while push delivery is unavailable.
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

/// Number of fallback polls between attempts to re-establish push.
const POLLS_BEFORE_PUSH_RETRY: u32 = 6;

/// Handle to one live match subscription.
///
/// Dropping the handle aborts the delivery task; `close` does the same
/// explicitly. Either way the task, its WebSocket connection and its
/// poll timer are released.
#[derive(Debug)]
pub struct Subscription {
    match_id: String,
    task: JoinHandle<()>,
}

impl Subscription {
    /// The match this subscription observes.
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Tear the subscription down.
    pub fn close(self) {
        self.task.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Registry keeping at most one active subscription per match.
///
/// `subscribe` replaces any prior registration for the same match;
/// `unsubscribe` is a no-op for unknown matches and safe to repeat.
pub struct LiveSubscriber {
    client: LiveScoreClient,
    active: Mutex<HashMap<String, Subscription>>,
}

impl LiveSubscriber {
    pub fn new(client: LiveScoreClient) -> Self {
        Self {
            client,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to `match_id`, replacing any existing registration.
    pub fn subscribe<F>(&self, match_id: &str, on_change: F) -> Result<(), ClientError>
    where
        F: Fn(MatchStateSnapshot) + Send + Sync + 'static,
    {
        let sub = self.client.subscribe(match_id, on_change)?;
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Inserting drops (and thereby aborts) the replaced subscription.
        active.insert(match_id.to_string(), sub);
        Ok(())
    }

    /// Release the registration for `match_id`, if any.
    pub fn unsubscribe(&self, match_id: &str) {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        active.remove(match_id);
    }
}

/// Spawn the delivery task for one match.
pub(super) fn spawn<F>(
    client: LiveScoreClient,
    base_url: &Url,
    match_id: &str,
    on_change: F,
) -> Result<Subscription, ClientError>
where
    F: Fn(MatchStateSnapshot) + Send + Sync + 'static,
{
    let ws_url = ws_url_for(base_url, match_id)?;
    let id = match_id.to_string();
    let task_id = id.clone();
    let task = tokio::spawn(async move {
        run_delivery(client, task_id, ws_url, on_change).await;
    });
    Ok(Subscription { match_id: id, task })
}

/// Derive the live-stream WebSocket URL from the HTTP base URL.
fn ws_url_for(base_url: &Url, match_id: &str) -> Result<Url, ClientError> {
    let mut url = base_url.join(&format!("/api/v1/matches/{match_id}/live"))?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(ClientError::Scheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| ClientError::Scheme(scheme.to_string()))?;
    Ok(url)
}

/// The delivery loop: push until it fails, poll while degraded, retry.
async fn run_delivery<F>(client: LiveScoreClient, match_id: String, ws_url: Url, on_change: F)
where
    F: Fn(MatchStateSnapshot) + Send + Sync + 'static,
{
    loop {
        match push_delivery(&ws_url, &on_change).await {
            Ok(()) => {
                info!(%match_id, "live stream closed by server");
                return;
            }
            Err(e) => {
                warn!(%match_id, error = %e, "push delivery unavailable, falling back to polling");
            }
        }

        for _ in 0..POLLS_BEFORE_PUSH_RETRY {
            match poll_state(&client, &match_id).await {
                Ok(state) => on_change(state),
                Err(e) => warn!(%match_id, error = %e, "live state poll failed"),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Forward push frames until the stream closes or errors.
///
/// Returns `Ok(())` only on an orderly close initiated by the server.
async fn push_delivery<F>(ws_url: &Url, on_change: &F) -> Result<(), ClientError>
where
    F: Fn(MatchStateSnapshot),
{
    let (mut stream, _response) = tokio_tungstenite::connect_async(ws_url.as_str()).await?;

    while let Some(frame) = stream.next().await {
        match frame? {
            Message::Text(text) => match serde_json::from_str::<WsServerMessage>(&text) {
                Ok(WsServerMessage::StateUpdate { state }) => on_change(state),
                Ok(WsServerMessage::Error { code, reason }) => {
                    warn!(code, %reason, "live stream reported server error");
                }
                Err(e) => debug!(error = %e, "ignoring unparseable live frame"),
            },
            Message::Close(_) => return Ok(()),
            _ => {}
        }
    }
    Ok(())
}

/// One fallback poll: read the clock and the event log.
///
/// A missing feed (stats 404) is an empty log, not an error; the clock
/// endpoint never 404s.
async fn poll_state(
    client: &LiveScoreClient,
    match_id: &str,
) -> Result<MatchStateSnapshot, ClientError> {
    let clock = client.clock(match_id).await?;
    let events = match client.stats(match_id).await {
        Ok(stats) => stats.events,
        Err(ClientError::Api { status, .. }) if status == reqwest::StatusCode::NOT_FOUND => {
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    Ok(MatchStateSnapshot {
        match_id: match_id.to_string(),
        clock,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_subscription(match_id: &str) -> Subscription {
        Subscription {
            match_id: match_id.to_string(),
            task: tokio::spawn(std::future::pending::<()>()),
        }
    }

    #[test]
    fn ws_url_swaps_scheme() {
        let base = Url::parse("http://localhost:8080/").unwrap();
        let ws = ws_url_for(&base, "m1").unwrap();
        assert_eq!(ws.as_str(), "ws://localhost:8080/api/v1/matches/m1/live");

        let base = Url::parse("https://score.example.com/").unwrap();
        let wss = ws_url_for(&base, "m1").unwrap();
        assert_eq!(wss.scheme(), "wss");
    }

    #[test]
    fn ws_url_rejects_non_http_scheme() {
        let base = Url::parse("ftp://score.example.com/").unwrap();
        assert!(matches!(
            ws_url_for(&base, "m1"),
            Err(ClientError::Scheme(_))
        ));
    }

    async fn wait_finished(probe: &tokio::task::AbortHandle) -> bool {
        for _ in 0..100 {
            if probe.is_finished() {
                return true;
            }
            tokio::task::yield_now().await;
        }
        probe.is_finished()
    }

    #[tokio::test]
    async fn close_aborts_the_delivery_task() {
        let sub = dummy_subscription("m1");
        let probe = sub.task.abort_handle();
        assert_eq!(sub.match_id(), "m1");
        sub.close();
        assert!(wait_finished(&probe).await);
    }

    #[tokio::test]
    async fn resubscribing_replaces_the_prior_registration() {
        let client = LiveScoreClient::new(Url::parse("http://127.0.0.1:1/").unwrap());
        let subscriber = LiveSubscriber::new(client);

        let first = dummy_subscription("m1");
        let first_probe = first.task.abort_handle();
        subscriber
            .active
            .lock()
            .unwrap()
            .insert("m1".to_string(), first);

        let second = dummy_subscription("m1");
        subscriber
            .active
            .lock()
            .unwrap()
            .insert("m1".to_string(), second);

        assert!(wait_finished(&first_probe).await);

        // Unknown and repeated unsubscribes are no-ops.
        subscriber.unsubscribe("m1");
        subscriber.unsubscribe("m1");
        subscriber.unsubscribe("never-subscribed");
        assert!(subscriber.active.lock().unwrap().is_empty());
    }
}
