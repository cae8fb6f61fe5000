use showbot_backend::config;
use showbot_backend::logging;
use showbot_backend::module::captain::load_captains;
use showbot_backend::module::catalog::ItemCache;
use showbot_backend::module::fetcher::HttpPageSource;
use showbot_backend::module::handler::MessageHandler;
use showbot_backend::module::lookup::LookupService;
use showbot_backend::module::market::ListingCache;
use showbot_backend::module::scheduled::{ScheduledTaskConfig, ScheduledTaskManager};

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const CONSOLE_CHANNEL: &str = "console";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = config::read_config(&config_path)?;

    // Initialize logging
    let _logging_guard = logging::init_logging(&config.log_dir, "showbot-backend", &config.log_level)?;

    tracing::info!("Showbot backend starting...");
    tracing::info!("Listings: {}", config.listings_url);
    tracing::info!("Items: {}", config.items_url);

    let client = HttpPageSource::build_client(config.request_timeout())?;

    let listings = Arc::new(
        ListingCache::new(Arc::new(HttpPageSource::new(client.clone(), config.listings_url.clone())))
            .keep_previous_on_empty(config.keep_previous_on_empty),
    );
    let items = Arc::new(
        ItemCache::new(Arc::new(HttpPageSource::new(client.clone(), config.items_url.clone())))
            .keep_previous_on_empty(config.keep_previous_on_empty),
    );
    let captains = Arc::new(load_captains(config, &client).await);

    // Configure and start scheduled tasks
    let task_config = ScheduledTaskConfig {
        listing_refresh_interval: config.listing_refresh_interval(),
        item_refresh_interval: config.item_refresh_interval(),
        perform_initial_update: true,
    };
    let mut task_manager = ScheduledTaskManager::new(task_config, listings.clone(), items.clone());
    task_manager.start_all();

    let handler = MessageHandler::new(Arc::new(LookupService::new(listings, items, captains)));

    tracing::info!("Reading commands from stdin (e.g. \"!price Mike Trout\")");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("stdin closed.");
                    break;
                };
                for reply in handler.handle_message(CONSOLE_CHANNEL, &line).await {
                    println!("{}", reply);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received.");
                break;
            }
        }
    }

    task_manager.shutdown().await;

    Ok(())
}
