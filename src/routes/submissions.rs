use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use crate::core::AutomationGrader;
use crate::error::ScoringError;
use crate::models::{
    ChallengeResultRequest, ChallengeResultResponse, GradeResult, GradeSubmissionRequest,
    GradeSubmissionResponse, HistoryQuery, HistoryResponse, SubmissionAttempt, SubmissionKind,
};
use crate::routes::{error_response, AppState};
use crate::services::{AnalyzerError, StoreError};

/// Configure grading and challenge routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/submissions/grade", web::post().to(grade_submission))
        .route("/submissions/history", web::get().to(get_history))
        .route("/challenges/result", web::post().to(record_challenge_result));
}

/// Grade a join or task submission
///
/// POST /api/v1/submissions/grade
///
/// Request body:
/// ```json
/// {
///   "developerId": "string",
///   "kind": "project_join",
///   "listingId": "string",
///   "sourceText": "string",
///   "language": "python"
/// }
/// ```
///
/// Code that cannot be parsed is an automatic fail and still counts as an
/// attempt.
async fn grade_submission(
    state: web::Data<AppState>,
    req: web::Json<GradeSubmissionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    if req.kind == SubmissionKind::WeeklyChallenge {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Unsupported submission kind",
            "weekly challenge results are recorded through /challenges/result",
        );
    }

    if let Err(e) = state.store.get_profile(&req.developer_id).await {
        return error_response(StatusCode::NOT_FOUND, "Profile not found", e);
    }

    let listing = match state.store.get_listing(&req.listing_id).await {
        Ok(listing) => listing,
        Err(e) => return error_response(StatusCode::NOT_FOUND, "Listing not found", e),
    };

    if listing.archived && req.kind == SubmissionKind::ProjectJoin {
        return error_response(
            StatusCode::CONFLICT,
            "Listing archived",
            format!("listing {} no longer accepts join requests", listing.listing_id),
        );
    }

    let req = req.into_inner();
    let mut attempt = SubmissionAttempt::new(
        req.developer_id,
        req.kind,
        req.listing_id,
        req.source_text,
        req.language,
    );

    let expected = AutomationGrader::expected_language(&attempt, &listing);

    let result = match state.analyzer.analyze(&attempt.source_text, &expected).await {
        Ok(signals) => state
            .gate
            .apply(state.grader.score_signals(&signals), attempt.kind),
        Err(AnalyzerError::Scoring(ScoringError::UnparsableSubmission(reason))) => {
            tracing::info!("Submission {} is unparsable: {}", attempt.attempt_id, reason);
            GradeResult::automatic_fail(&reason)
        }
        Err(e) => {
            tracing::error!("Analysis failed for {}: {}", attempt.attempt_id, e);
            return error_response(StatusCode::BAD_GATEWAY, "Analysis failed", e);
        }
    };

    if let Err(e) = attempt.record_grade(result.score, result.passed) {
        tracing::error!("Failed to record grade: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record grade", e);
    }

    let attempt_id = attempt.attempt_id;
    let kind = attempt.kind;
    let developer_id = attempt.developer_id.clone();

    let stats = match state.store.append_attempt(attempt).await {
        Ok(stats) => stats,
        Err(StoreError::History(e)) => {
            return error_response(StatusCode::CONFLICT, "Attempt rejected", e);
        }
        Err(e) => {
            tracing::error!("Failed to store attempt: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store attempt", e);
        }
    };

    let learning_support = kind == SubmissionKind::ProjectJoin
        && state.gate.should_trigger_learning_support(stats.failed);

    if learning_support {
        tracing::info!(
            "Learning support triggered for {} after {} failed join attempts",
            developer_id,
            stats.failed
        );
    }

    tracing::info!(
        "Graded {} attempt {} for {}: {:.1} ({})",
        kind,
        attempt_id,
        developer_id,
        result.score,
        if result.passed { "passed" } else { "failed" }
    );

    HttpResponse::Ok().json(GradeSubmissionResponse {
        attempt_id,
        kind,
        result,
        failed_attempts: stats.failed,
        learning_support,
    })
}

/// Attempt history for a developer and submission kind
///
/// GET /api/v1/submissions/history?developerId=...&kind=project_join
async fn get_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    if query.developer_id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", "developerId is required");
    }

    let history = state.store.history(&query.developer_id, query.kind).await;
    let failed_attempts = history.failed_count();
    let learning_support = query.kind == SubmissionKind::ProjectJoin
        && state.gate.should_trigger_learning_support(failed_attempts);

    HttpResponse::Ok().json(HistoryResponse {
        developer_id: query.developer_id.clone(),
        kind: query.kind,
        failed_attempts,
        consecutive_failures: history.consecutive_failures(),
        learning_support,
        attempts: history.attempts().to_vec(),
    })
}

/// Record a weekly challenge outcome
///
/// POST /api/v1/challenges/result
///
/// Request body:
/// ```json
/// {
///   "developerId": "string",
///   "challengeId": "string",
///   "score": 7
/// }
/// ```
async fn record_challenge_result(
    state: web::Data<AppState>,
    req: web::Json<ChallengeResultRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let passed = state.gate.weekly_challenge_passed(req.score);
    let accumulated_points = state
        .store
        .record_challenge(&req.developer_id, &req.challenge_id, req.score, passed)
        .await;
    let skill_map_unlocked = state.gate.skill_map_unlocked(accumulated_points);

    tracing::info!(
        "Challenge {} for {}: {} points ({}), total {}",
        req.challenge_id,
        req.developer_id,
        req.score,
        if passed { "passed" } else { "failed" },
        accumulated_points
    );

    HttpResponse::Ok().json(ChallengeResultResponse {
        developer_id: req.developer_id.clone(),
        challenge_id: req.challenge_id.clone(),
        score: req.score,
        passed,
        accumulated_points,
        skill_map_unlocked,
    })
}
