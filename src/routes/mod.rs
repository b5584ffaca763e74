// Route exports
pub mod shops;

use crate::models::ErrorResponse;
use actix_web::{error, web, HttpRequest};

pub use shops::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(shops::configure),
    );
}

/// JSON extractor config that reports bad bodies as [`ErrorResponse`]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, req: &HttpRequest| {
        tracing::info!("JSON payload error on {}: {}", req.path(), err);
        ErrorResponse::new("invalid_json", format!("Invalid JSON: {}", err), 400).into()
    })
}

/// Query extractor config that reports bad query strings as [`ErrorResponse`]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, req: &HttpRequest| {
        tracing::info!("Query error on {}: {}", req.path(), err);
        ErrorResponse::new("invalid_query", format!("Invalid query: {}", err), 400).into()
    })
}
