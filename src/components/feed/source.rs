use super::models::FeedSpec;
use crate::error::{fetch_error, ShiftResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Something that can produce the raw ICS text of a feed
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    async fn fetch(&self, feed: &FeedSpec) -> ShiftResult<String>;
}

/// Fetches feeds with a plain HTTP GET
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Create a source whose requests fail after `timeout`
    pub fn new(timeout: Duration) -> ShiftResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| fetch_error(&format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, feed: &FeedSpec) -> ShiftResult<String> {
        debug!("Fetching feed {}", feed.id);

        let response = self
            .client
            .get(feed.url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    fetch_error(&format!("Timed out fetching feed {}", feed.id))
                } else {
                    fetch_error(&format!("Failed to fetch feed {}: {}", feed.id, e))
                }
            })?;

        if !response.status().is_success() {
            return Err(fetch_error(&format!(
                "Failed to fetch feed {}: HTTP {}",
                feed.id,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| fetch_error(&format!("Failed to read feed {}: {}", feed.id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use axum::{http::StatusCode, routing::get, Router};
    use tokio::net::TcpListener;
    use url::Url;

    const CALENDAR: &str = "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n";

    /// Serve `router` on an ephemeral local port and return its base URL
    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn feed(base: &str, path: &str) -> FeedSpec {
        FeedSpec::new("dublin15", Url::parse(&format!("{}{}", base, path)).unwrap())
    }

    fn test_router() -> Router {
        Router::new()
            .route("/feed.ics", get(|| async { CALENDAR }))
            .route(
                "/broken.ics",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/slow.ics",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    CALENDAR
                }),
            )
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = serve(test_router()).await;
        let source = HttpFeedSource::new(Duration::from_secs(5)).unwrap();

        let text = source.fetch(&feed(&base, "/feed.ics")).await.unwrap();
        assert_eq!(text, CALENDAR);
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let base = serve(test_router()).await;
        let source = HttpFeedSource::new(Duration::from_secs(5)).unwrap();

        let err = source.fetch(&feed(&base, "/broken.ics")).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert!(err.to_string().contains("500"));

        let err = source.fetch(&feed(&base, "/missing.ics")).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_fetch_error() {
        let base = serve(test_router()).await;
        let source = HttpFeedSource::new(Duration::from_millis(200)).unwrap();

        let err = source.fetch(&feed(&base, "/slow.ics")).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert!(err.to_string().contains("Timed out"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        // Take a free port, then close it again
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpFeedSource::new(Duration::from_secs(5)).unwrap();
        let err = source
            .fetch(&feed(&format!("http://{}", addr), "/feed.ics"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }
}
