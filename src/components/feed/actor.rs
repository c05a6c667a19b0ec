use super::cache::FeedCache;
use super::models::FeedSpec;
use super::source::FeedSource;
use crate::error::{component_error, ShiftResult};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The feed actor that owns the cache and serialises fetches
pub struct FeedActor {
    source: Arc<dyn FeedSource>,
    cache: FeedCache,
    command_rx: mpsc::Receiver<FeedCommand>,
}

/// Commands that can be sent to the feed actor
pub enum FeedCommand {
    Fetch(FeedSpec, DateTime<Utc>, mpsc::Sender<ShiftResult<String>>),
    InvalidateAll(mpsc::Sender<()>),
    Shutdown,
}

/// Handle for communicating with the feed actor
#[derive(Clone)]
pub struct FeedActorHandle {
    command_tx: mpsc::Sender<FeedCommand>,
}

impl FeedActorHandle {
    /// Raw text of a feed, from cache when still fresh at `now`
    pub async fn fetch(&self, feed: FeedSpec, now: DateTime<Utc>) -> ShiftResult<String> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedCommand::Fetch(feed, now, response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Clear the cache
    pub async fn invalidate_all(&self) -> ShiftResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedCommand::InvalidateAll(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> ShiftResult<()> {
        let _ = self.command_tx.send(FeedCommand::Shutdown).await;
        Ok(())
    }
}

impl FeedActor {
    /// Create a new actor and return its handle
    pub fn new(source: Arc<dyn FeedSource>, ttl: Duration) -> (Self, FeedActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            source,
            cache: FeedCache::new(ttl),
            command_rx,
        };

        (actor, FeedActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Feed actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                FeedCommand::Fetch(feed, now, response_tx) => {
                    let result = self.fetch(&feed, now).await;
                    let _ = response_tx.send(result).await;
                }
                FeedCommand::InvalidateAll(response_tx) => {
                    info!("Clearing {} cached feeds", self.cache.len());
                    self.cache.invalidate_all();
                    let _ = response_tx.send(()).await;
                }
                FeedCommand::Shutdown => {
                    info!("Feed actor shutting down");
                    break;
                }
            }
        }

        info!("Feed actor shut down");
    }

    async fn fetch(&mut self, feed: &FeedSpec, now: DateTime<Utc>) -> ShiftResult<String> {
        if let Some(text) = self.cache.get(&feed.id, now) {
            debug!("Using cached text for feed {}", feed.id);
            return Ok(text.to_string());
        }

        match self.source.fetch(feed).await {
            Ok(text) => {
                info!("Fetched feed {} ({} bytes)", feed.id, text.len());
                self.cache.insert(feed.id.clone(), text.clone(), now);
                Ok(text)
            }
            Err(e) => {
                warn!("Fetching feed {} failed: {}", feed.id, e);
                Err(e)
            }
        }
    }
}
