use super::actor::{FeedActor, FeedActorHandle};
use super::models::FeedSpec;
use super::source::FeedSource;
use crate::error::ShiftResult;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the feed actor
#[derive(Clone)]
pub struct FeedHandle {
    actor_handle: FeedActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl FeedHandle {
    /// Create a new FeedHandle and spawn the actor
    pub fn new(source: Arc<dyn FeedSource>, ttl: Duration) -> Self {
        let (mut actor, handle) = FeedActor::new(source, ttl);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Raw text of a feed, from cache when still fresh at `now`
    pub async fn fetch(&self, feed: FeedSpec, now: DateTime<Utc>) -> ShiftResult<String> {
        self.actor_handle.fetch(feed, now).await
    }

    /// Clear the cache so the next fetch goes to the source
    pub async fn invalidate_all(&self) -> ShiftResult<()> {
        self.actor_handle.invalidate_all().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> ShiftResult<()> {
        self.actor_handle.shutdown().await
    }
}
