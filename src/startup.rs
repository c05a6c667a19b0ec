use crate::components::feed::{FeedHandle, HttpFeedSource};
use crate::components::shifts::ShiftAggregator;
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use crate::web::{self, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config once; it is shared read-only afterwards
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => {
            if !config.has_feeds() {
                warn!("No ICS URLs configured, the dashboard will show a configuration error");
            }
            Ok(Arc::new(config))
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the feed actor and aggregator, then serve HTTP until shutdown
pub async fn start_server(config: Arc<Config>) -> miette::Result<()> {
    let source = HttpFeedSource::new(Duration::from_secs(config.fetch_timeout_secs))?;
    let feeds = FeedHandle::new(Arc::new(source), config.cache_ttl);

    let aggregator = ShiftAggregator::new(Arc::clone(&config), feeds.clone());
    let app = web::router(AppState { aggregator });

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(Error::from)?;
    info!("Dashboard listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from);

    // Stop the feed actor whatever the server outcome
    if let Err(e) = feeds.shutdown().await {
        error!("Error shutting down feed actor: {:?}", e);
    } else {
        info!("Feed actor shut down successfully");
    }

    served?;
    Ok(())
}
