//! Background refresh of conversations, messages and notifications.
//!
//! One task drives every feed. Each feed has its own interval and its own
//! exponential backoff: a failure doubles the feed's delay up to a cap, a
//! success resets it. Results are delivered as [`SyncEvent`]s on an mpsc
//! channel; dropping the receiver or cancelling the token ends the task.

pub mod timeline;

pub use timeline::{Entry, Timeline};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::config::SyncConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{Conversation, Message, Notification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Conversations,
    Messages,
    Notifications,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conversations => write!(f, "conversations"),
            Self::Messages => write!(f, "messages"),
            Self::Notifications => write!(f, "notifications"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SyncEvent {
    Conversations(Vec<Conversation>),
    Messages {
        conversation_id: u64,
        messages: Vec<Message>,
    },
    Notifications(Vec<Notification>),
    /// A poll failed; the feed will retry after `retry_in`.
    FeedError {
        feed: Feed,
        error: String,
        retry_in: Duration,
    },
    /// The server rejected the session. The subscription stops after this.
    SessionExpired,
}

/// Doubling delay with a ceiling.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            current: base,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Record a failure and return the new delay.
    pub fn record_failure(&mut self) -> Duration {
        self.current = (self.current * 2).min(self.max);
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

/// Where polled data comes from.
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    async fn conversations(&self) -> ClientResult<Vec<Conversation>>;
    async fn messages(&self, conversation_id: u64) -> ClientResult<Vec<Message>>;
    async fn notifications(&self) -> ClientResult<Vec<Notification>>;
}

#[async_trait]
impl FeedSource for ApiClient {
    async fn conversations(&self) -> ClientResult<Vec<Conversation>> {
        self.chat().conversations().await
    }

    async fn messages(&self, conversation_id: u64) -> ClientResult<Vec<Message>> {
        self.chat().messages(conversation_id).await
    }

    async fn notifications(&self) -> ClientResult<Vec<Notification>> {
        self.chat().notifications().await
    }
}

#[derive(Debug, Clone)]
pub struct SubscriptionConfig {
    pub conversations_interval: Duration,
    pub messages_interval: Duration,
    pub notifications_interval: Duration,
    pub max_backoff: Duration,
}

impl From<&SyncConfig> for SubscriptionConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            conversations_interval: Duration::from_secs(config.conversations_interval_secs),
            messages_interval: Duration::from_secs(config.messages_interval_secs),
            notifications_interval: Duration::from_secs(config.notifications_interval_secs),
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        }
    }
}

struct FeedState {
    feed: Feed,
    backoff: Backoff,
    next_due: Instant,
}

impl FeedState {
    fn new(feed: Feed, interval: Duration, max: Duration) -> Self {
        Self {
            feed,
            backoff: Backoff::new(interval, max),
            next_due: Instant::now(),
        }
    }
}

/// Handle to a running sync task.
pub struct Subscription {
    cancel: CancellationToken,
    focus: watch::Sender<Option<u64>>,
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Start polling. The messages feed stays idle until a conversation is
    /// opened with [`Subscription::open_conversation`].
    pub fn spawn<S: FeedSource>(
        source: Arc<S>,
        config: SubscriptionConfig,
        buffer: usize,
    ) -> (Self, mpsc::Receiver<SyncEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let (focus_tx, focus_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        info!(
            conversations_secs = config.conversations_interval.as_secs_f64(),
            messages_secs = config.messages_interval.as_secs_f64(),
            notifications_secs = config.notifications_interval.as_secs_f64(),
            "Starting sync subscription"
        );

        let handle = tokio::spawn(run(source, config, tx, focus_rx, cancel.clone()));

        (
            Self {
                cancel,
                focus: focus_tx,
                handle,
            },
            rx,
        )
    }

    /// Point the messages feed at a conversation, or stop it with `None`.
    pub fn open_conversation(&self, conversation_id: Option<u64>) {
        self.focus.send_replace(conversation_id);
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Sync task ended abnormally");
        }
    }
}

async fn run<S: FeedSource>(
    source: Arc<S>,
    config: SubscriptionConfig,
    tx: mpsc::Sender<SyncEvent>,
    mut focus: watch::Receiver<Option<u64>>,
    cancel: CancellationToken,
) {
    let mut feeds = [
        FeedState::new(Feed::Conversations, config.conversations_interval, config.max_backoff),
        FeedState::new(Feed::Messages, config.messages_interval, config.max_backoff),
        FeedState::new(Feed::Notifications, config.notifications_interval, config.max_backoff),
    ];
    let mut focus_open = true;

    loop {
        let open_conversation = *focus.borrow();
        let next_due = feeds
            .iter()
            .filter(|f| f.feed != Feed::Messages || open_conversation.is_some())
            .map(|f| f.next_due)
            .min();
        let Some(next_due) = next_due else {
            break;
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Sync subscription cancelled");
                break;
            }
            changed = focus.changed(), if focus_open => {
                if changed.is_err() {
                    focus_open = false;
                    continue;
                }
                // refresh the newly opened conversation right away
                let messages = &mut feeds[1];
                messages.backoff.reset();
                messages.next_due = Instant::now();
            }
            _ = sleep_until(next_due) => {
                let now = Instant::now();
                for state in feeds.iter_mut().filter(|f| f.next_due <= now) {
                    let event = match (state.feed, open_conversation) {
                        (Feed::Conversations, _) => source
                            .conversations()
                            .await
                            .map(SyncEvent::Conversations),
                        (Feed::Messages, Some(conversation_id)) => source
                            .messages(conversation_id)
                            .await
                            .map(|messages| SyncEvent::Messages { conversation_id, messages }),
                        (Feed::Messages, None) => continue,
                        (Feed::Notifications, _) => source
                            .notifications()
                            .await
                            .map(SyncEvent::Notifications),
                    };

                    let event = match event {
                        Ok(event) => {
                            state.backoff.reset();
                            event
                        }
                        Err(ClientError::Unauthorized) => {
                            warn!(feed = %state.feed, "Session expired, stopping sync");
                            let _ = tx.send(SyncEvent::SessionExpired).await;
                            return;
                        }
                        Err(e) => {
                            let retry_in = state.backoff.record_failure();
                            warn!(feed = %state.feed, error = %e, retry_secs = retry_in.as_secs_f64(), "Feed poll failed");
                            SyncEvent::FeedError {
                                feed: state.feed,
                                error: e.to_string(),
                                retry_in,
                            }
                        }
                    };
                    state.next_due = Instant::now() + state.backoff.current();

                    if tx.send(event).await.is_err() {
                        debug!("Sync receiver dropped");
                        return;
                    }
                }
            }
        }
    }
}

/// Send a message through an optimistic timeline entry.
pub async fn send_message(
    api: &ApiClient,
    timeline: &mut Timeline,
    content: &str,
    attachment: Option<&Path>,
) -> ClientResult<Message> {
    let local_id = timeline.push_pending(content);
    deliver(api, timeline, local_id, content, attachment).await
}

/// Send a failed entry again. The same entry ends up confirmed or failed.
pub async fn resend(
    api: &ApiClient,
    timeline: &mut Timeline,
    local_id: Uuid,
    attachment: Option<&Path>,
) -> ClientResult<Message> {
    let content = timeline
        .retry(local_id)
        .ok_or_else(|| ClientError::Precondition("No failed message to resend".to_string()))?;
    deliver(api, timeline, local_id, &content, attachment).await
}

async fn deliver(
    api: &ApiClient,
    timeline: &mut Timeline,
    local_id: Uuid,
    content: &str,
    attachment: Option<&Path>,
) -> ClientResult<Message> {
    match api
        .chat()
        .send_message(timeline.conversation_id(), content, attachment)
        .await
    {
        Ok(message) => {
            timeline.confirm(local_id, message.clone());
            Ok(message)
        }
        Err(e) => {
            debug!(conversation_id = timeline.conversation_id(), error = %e, "Message send failed");
            timeline.fail(local_id, e.to_string());
            Err(e)
        }
    }
}
