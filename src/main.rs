use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use techsync_match::config::{LoggingSettings, Settings};
use techsync_match::routes::{self, AppState};
use techsync_match::services::{AnalyzerBackend, CacheManager, Store};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(logging: &LoggingSettings) {
    // LOG_LEVEL/LOG_FORMAT override the config file, RUST_LOG overrides both
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn config_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let loaded = Settings::load();
    init_logging(
        loaded
            .as_ref()
            .map(|s| &s.logging)
            .unwrap_or(&LoggingSettings::default()),
    );

    let settings = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        config_error(e)
    })?;

    info!("Starting TechSync match service...");

    let matcher = settings.matcher().map_err(config_error)?;
    let grader = settings.grader().map_err(config_error)?;
    let gate = settings.gate();

    info!("Matcher initialized with weights: {:?}", matcher.scorer().weights());

    let analyzer = AnalyzerBackend::from_settings(&settings.analyzer).map_err(|e| {
        error!("Failed to initialize analyzer: {}", e);
        config_error(e)
    })?;

    info!("Static analyzer: {}", analyzer.name());

    let cache = CacheManager::new(settings.cache.l1_cache_size, settings.cache.ttl_secs);
    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s)",
        settings.cache.l1_cache_size, settings.cache.ttl_secs
    );

    // Build application state
    let app_state = AppState {
        store: Arc::new(Store::new()),
        cache: Arc::new(cache),
        analyzer: Arc::new(analyzer),
        matcher,
        grader,
        gate,
        default_limit: settings.matching.default_limit,
        max_limit: settings.matching.max_limit,
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
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
