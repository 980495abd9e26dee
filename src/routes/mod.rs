// Route exports
pub mod matches;
pub mod submissions;

use actix_web::{http::StatusCode, web, HttpResponse};
use std::sync::Arc;

use crate::core::{AutomationGrader, Matcher, ThresholdGate};
use crate::models::ErrorResponse;
use crate::services::{AnalyzerBackend, CacheManager, Store};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub cache: Arc<CacheManager>,
    pub analyzer: Arc<AnalyzerBackend>,
    pub matcher: Matcher,
    pub grader: AutomationGrader,
    pub gate: ThresholdGate,
    pub default_limit: u16,
    pub max_limit: u16,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(submissions::configure),
    );
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: status.as_u16(),
    })
}
