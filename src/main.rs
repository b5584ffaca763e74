use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use konamon_finder::config::Settings;
use konamon_finder::core::ShopRanker;
use konamon_finder::routes::{self, AppState};
use konamon_finder::services::{CatalogClient, ShopCache};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so logging can honour it
    let settings = Settings::load();
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Konamon Finder service...");

    let settings = settings.map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    let utc_offset = settings
        .ranking
        .utc_offset()
        .map_err(|e| startup_error("Invalid ranking configuration", e))?;

    let catalog = Arc::new(
        CatalogClient::new(
            settings.catalog.base_url.clone(),
            settings.catalog.timeout(),
        )
        .map_err(|e| startup_error("Failed to create catalog client", e))?,
    );

    info!(
        "Catalog client initialized ({}, timeout {}s)",
        settings.catalog.base_url, settings.catalog.timeout_secs
    );

    let cache = Arc::new(ShopCache::new(settings.cache.capacity, settings.cache.ttl_secs));

    info!(
        "Shop cache initialized ({} entries, TTL: {}s)",
        settings.cache.capacity, settings.cache.ttl_secs
    );

    let ranker = ShopRanker::new(settings.ranking.default_limit, settings.ranking.max_limit);

    info!("Ranker initialized: {:?}, shop clock UTC{}", ranker, utc_offset);

    let app_state = AppState {
        catalog,
        cache,
        ranker,
        utc_offset,
        default_radius_km: settings.ranking.default_radius_km,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
