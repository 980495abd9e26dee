use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{
    DeveloperProfile, HealthResponse, MatchResult, ProjectListing, RecommendRequest,
    RecommendResponse, ScoreMatchRequest, ScoreMatchResponse, UpsertListingRequest,
    UpsertProfileRequest,
};
use crate::routes::{error_response, AppState};
use crate::services::{CacheKey, StoreError};

/// Configure profile, listing and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/profiles", web::put().to(upsert_profile))
        .route("/listings", web::put().to(upsert_listing))
        .route("/listings/{listing_id}/archive", web::post().to(archive_listing))
        .route("/matches/score", web::post().to(score_match))
        .route("/matches/recommend", web::post().to(recommend));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    tracing::trace!(
        "Health check, analyzer: {}, cached results: {}",
        state.analyzer.name(),
        state.cache.stats().l1_size
    );

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Create or replace a developer profile
///
/// PUT /api/v1/profiles
async fn upsert_profile(
    state: web::Data<AppState>,
    req: web::Json<UpsertProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for profile {}: {}", req.developer_id, errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let profile: DeveloperProfile = req.into_inner().into();
    let developer_id = profile.developer_id.clone();
    let created = state.store.upsert_profile(profile.clone()).await;

    // Any cached score for this developer is now stale
    state.cache.invalidate_developer(&developer_id);

    tracing::info!("Profile {} {}", developer_id, if created { "created" } else { "updated" });

    if created {
        HttpResponse::Created().json(profile)
    } else {
        HttpResponse::Ok().json(profile)
    }
}

/// Publish a listing or update its requirements
///
/// PUT /api/v1/listings
async fn upsert_listing(
    state: web::Data<AppState>,
    req: web::Json<UpsertListingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let listing: ProjectListing = req.into_inner().into();

    match state.store.upsert_listing(listing).await {
        Ok(stored) => {
            state.cache.invalidate_listing(&stored.listing_id);
            tracing::info!("Listing {} saved", stored.listing_id);
            HttpResponse::Ok().json(stored)
        }
        Err(StoreError::Archived(id)) => error_response(
            StatusCode::CONFLICT,
            "Listing archived",
            format!("listing {} is archived and can no longer change", id),
        ),
        Err(e) => {
            tracing::error!("Failed to save listing: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save listing", e)
        }
    }
}

/// Archive a listing
///
/// POST /api/v1/listings/{listing_id}/archive
async fn archive_listing(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let listing_id = path.into_inner();

    match state.store.archive_listing(&listing_id).await {
        Ok(()) => {
            state.cache.invalidate_listing(&listing_id);
            tracing::info!("Listing {} archived", listing_id);
            HttpResponse::Ok().json(serde_json::json!({
                "listingId": listing_id,
                "archived": true,
            }))
        }
        Err(e) => error_response(StatusCode::NOT_FOUND, "Listing not found", e),
    }
}

/// Score one developer against one listing
///
/// POST /api/v1/matches/score
///
/// Request body:
/// ```json
/// {
///   "developerId": "string",
///   "listingId": "string"
/// }
/// ```
async fn score_match(
    state: web::Data<AppState>,
    req: web::Json<ScoreMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let threshold = state.matcher.display_threshold();

    let (profile, profile_version) = match state.store.get_profile_versioned(&req.developer_id).await {
        Ok(found) => found,
        Err(e) => return error_response(StatusCode::NOT_FOUND, "Profile not found", e),
    };
    let (listing, listing_version) = match state.store.get_listing_versioned(&req.listing_id).await {
        Ok(found) => found,
        Err(e) => return error_response(StatusCode::NOT_FOUND, "Listing not found", e),
    };

    // A result computed from older versions is never looked up again
    let cache_key = CacheKey::match_result(
        &req.developer_id,
        profile_version,
        &req.listing_id,
        listing_version,
    );

    if let Ok(result) = state.cache.get::<MatchResult>(&cache_key).await {
        return HttpResponse::Ok().json(ScoreMatchResponse {
            developer_id: req.developer_id.clone(),
            listing_id: req.listing_id.clone(),
            displayable: result.is_displayable(threshold),
            result,
            cached: true,
        });
    }

    let result = match state.matcher.scorer().score(&profile, &listing) {
        Ok(result) => result,
        Err(e) => {
            tracing::info!("Cannot score {} against {}: {}", profile.developer_id, listing.listing_id, e);
            return error_response(StatusCode::BAD_REQUEST, "Cannot score match", e);
        }
    };

    if let Err(e) = state.cache.set(&cache_key, &result).await {
        tracing::warn!("Failed to cache match result: {}", e);
    }

    tracing::debug!(
        "Scored {} against {}: {:.1}",
        req.developer_id,
        req.listing_id,
        result.total_score
    );

    HttpResponse::Ok().json(ScoreMatchResponse {
        developer_id: req.developer_id.clone(),
        listing_id: req.listing_id.clone(),
        displayable: result.is_displayable(threshold),
        result,
        cached: false,
    })
}

/// Recommend listings for a developer
///
/// POST /api/v1/matches/recommend
///
/// Request body:
/// ```json
/// {
///   "developerId": "string",
///   "limit": 20,
///   "excludeListingIds": ["string"]
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let limit = if req.limit == 0 { state.default_limit } else { req.limit };
    let limit = limit.min(state.max_limit) as usize;

    let profile = match state.store.get_profile(&req.developer_id).await {
        Ok(profile) => profile,
        Err(e) => return error_response(StatusCode::NOT_FOUND, "Profile not found", e),
    };

    let listings = state.store.listings().await;

    let result = match state
        .matcher
        .recommend(&profile, listings, limit, &req.exclude_listing_ids)
    {
        Ok(result) => result,
        Err(e) => {
            tracing::info!("Cannot recommend for {}: {}", req.developer_id, e);
            return error_response(StatusCode::BAD_REQUEST, "Cannot recommend listings", e);
        }
    };

    tracing::info!(
        "Returning {} recommendations for {} (from {} listings)",
        result.matches.len(),
        req.developer_id,
        result.total_candidates
    );

    HttpResponse::Ok().json(RecommendResponse {
        matches: result.matches,
        total_results: result.total_candidates,
        skipped_invalid: result.skipped_invalid,
    })
}
