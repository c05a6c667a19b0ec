use shiftboard::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting shiftboard");

    // Load configuration
    let config = startup::load_config()?;

    // Serve the dashboard until a shutdown signal arrives
    startup::start_server(config).await
}
