// HTTP API tests for TechSync Match

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use techsync_match::core::{AutomationGrader, HeuristicAnalyzer, Matcher, ThresholdGate};
use techsync_match::routes::{self, AppState};
use techsync_match::services::{AnalyzerBackend, CacheManager, Store};

const PYTHON_SOLUTION: &str = r#"# Compute statistics for a list of numbers.
def mean(values):
    """Return the arithmetic mean."""
    if not values:
        return 0
    return sum(values) / len(values)


def classify(values):
    # Label each value relative to the mean.
    avg = mean(values)
    labels = []
    for v in values:
        if v > avg:
            labels.append("high")
        elif v < avg:
            labels.append("low")
        else:
            labels.append("avg")
    return labels
"#;

fn create_state() -> AppState {
    AppState {
        store: Arc::new(Store::new()),
        cache: Arc::new(CacheManager::new(1000, 60)),
        analyzer: Arc::new(AnalyzerBackend::Heuristic(HeuristicAnalyzer)),
        matcher: Matcher::with_default_scorer(),
        grader: AutomationGrader::default(),
        gate: ThresholdGate::default(),
        default_limit: 20,
        max_limit: 100,
    }
}

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn profile_body() -> Value {
    json!({
        "developerId": "dev_1",
        "languages": ["Python", "JS", "Go"],
        "topics": ["AI"],
        "experience": "intermediate"
    })
}

fn listing_body(id: &str, languages: &[&str], topic: &str) -> Value {
    json!({
        "listingId": id,
        "projectId": format!("project_{}", id),
        "ownerId": "pm_1",
        "topic": topic,
        "requiredLanguages": languages,
        "requiredExperience": "intermediate"
    })
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!();
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_profile_requires_three_languages() {
    let app = init_app!();
    let req = test::TestRequest::put()
        .uri("/api/v1/profiles")
        .set_json(json!({
            "developerId": "dev_1",
            "languages": ["Python"],
            "experience": 3
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_profile_language_aliases_rejected() {
    let app = init_app!();
    let req = test::TestRequest::put()
        .uri("/api/v1/profiles")
        .set_json(json!({
            "developerId": "dev_1",
            "languages": ["JS", "js", "javascript"],
            "experience": 3
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_listing_blank_topic_rejected() {
    let app = init_app!();
    let req = test::TestRequest::put()
        .uri("/api/v1/listings")
        .set_json(listing_body("l1", &["Python"], "   "))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_score_and_recommend() {
    let app = init_app!();

    let req = test::TestRequest::put().uri("/api/v1/profiles").set_json(profile_body()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    for (id, langs, topic) in [
        ("l1", vec!["Python", "JS"], "AI"),
        ("l2", vec!["Rust"], "Games"),
    ] {
        let req = test::TestRequest::put()
            .uri("/api/v1/listings")
            .set_json(listing_body(id, &langs, topic))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/score")
        .set_json(json!({"developerId": "dev_1", "listingId": "l1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["totalScore"], 100.0);
    assert_eq!(body["displayable"], true);
    assert_eq!(body["cached"], false);

    // Second call is served from cache
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/score")
        .set_json(json!({"developerId": "dev_1", "listingId": "l1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["cached"], true);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/recommend")
        .set_json(json!({"developerId": "dev_1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["listingId"], "l1");
    assert_eq!(body["total_results"], 2);
}

#[actix_web::test]
async fn test_listing_change_invalidates_cached_score() {
    let app = init_app!();

    let req = test::TestRequest::put().uri("/api/v1/profiles").set_json(profile_body()).to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::put()
        .uri("/api/v1/listings")
        .set_json(listing_body("l1", &["Python"], "AI"))
        .to_request();
    test::call_service(&app, req).await;

    let score = || {
        test::TestRequest::post()
            .uri("/api/v1/matches/score")
            .set_json(json!({"developerId": "dev_1", "listingId": "l1"}))
            .to_request()
    };
    let body: Value = test::call_and_read_body_json(&app, score()).await;
    assert_eq!(body["languageScore"], 100.0);

    let req = test::TestRequest::put()
        .uri("/api/v1/listings")
        .set_json(listing_body("l1", &["Python", "Rust"], "AI"))
        .to_request();
    test::call_service(&app, req).await;

    let body: Value = test::call_and_read_body_json(&app, score()).await;
    assert_eq!(body["cached"], false);
    assert_eq!(body["languageScore"], 50.0);
}

#[actix_web::test]
async fn test_archived_listing_is_frozen() {
    let app = init_app!();

    let req = test::TestRequest::put()
        .uri("/api/v1/listings")
        .set_json(listing_body("l1", &["Python"], "AI"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/api/v1/listings/l1/archive").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri("/api/v1/listings")
        .set_json(listing_body("l1", &["Go"], "AI"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post().uri("/api/v1/listings/missing/archive").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_score_unknown_profile() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/score")
        .set_json(json!({"developerId": "ghost", "listingId": "l1"}))
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_grade_join_submission() {
    let app = init_app!();

    let req = test::TestRequest::put().uri("/api/v1/profiles").set_json(profile_body()).to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::put()
        .uri("/api/v1/listings")
        .set_json(listing_body("l1", &["Python"], "AI"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/submissions/grade")
        .set_json(json!({
            "developerId": "dev_1",
            "kind": "project_join",
            "listingId": "l1",
            "sourceText": PYTHON_SOLUTION,
            "language": "python"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["passed"], true);
    assert_eq!(body["automaticFail"], false);
    assert_eq!(body["failedAttempts"], 0);
    assert!(body["score"].as_f64().unwrap() >= 70.0);
}

#[actix_web::test]
async fn test_unparsable_submissions_trigger_learning_support() {
    let app = init_app!();

    let req = test::TestRequest::put().uri("/api/v1/profiles").set_json(profile_body()).to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::put()
        .uri("/api/v1/listings")
        .set_json(listing_body("l1", &["JavaScript"], "AI"))
        .to_request();
    test::call_service(&app, req).await;

    for attempt in 1..=8 {
        let req = test::TestRequest::post()
            .uri("/api/v1/submissions/grade")
            .set_json(json!({
                "developerId": "dev_1",
                "kind": "project_join",
                "listingId": "l1",
                "sourceText": "function broken( {\n  return 1;\n",
                "language": "javascript"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["score"], 0.0);
        assert_eq!(body["automaticFail"], true);
        assert_eq!(body["failedAttempts"], attempt);
        assert_eq!(body["learningSupport"], attempt >= 8);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/submissions/history?developerId=dev_1&kind=project_join")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["attempts"].as_array().unwrap().len(), 8);
    assert_eq!(body["consecutiveFailures"], 8);
    assert_eq!(body["learningSupport"], true);
}

#[actix_web::test]
async fn test_weekly_challenge_not_graded_as_submission() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/api/v1/submissions/grade")
        .set_json(json!({
            "developerId": "dev_1",
            "kind": "weekly_challenge",
            "listingId": "l1",
            "sourceText": "x = 1",
            "language": "python"
        }))
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_weekly_challenges_unlock_skill_map() {
    let app = init_app!();

    let record = |challenge: &str, score: u32| {
        test::TestRequest::post()
            .uri("/api/v1/challenges/result")
            .set_json(json!({"developerId": "dev_1", "challengeId": challenge, "score": score}))
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&app, record("week-1", 6)).await;
    assert_eq!(body["passed"], false);
    assert_eq!(body["accumulatedPoints"], 0);

    let body: Value = test::call_and_read_body_json(&app, record("week-2", 7)).await;
    assert_eq!(body["passed"], true);
    assert_eq!(body["accumulatedPoints"], 7);
    assert_eq!(body["skillMapUnlocked"], false);

    let body: Value = test::call_and_read_body_json(&app, record("week-3", 8)).await;
    assert_eq!(body["accumulatedPoints"], 15);
    assert_eq!(body["skillMapUnlocked"], true);

    let resp = test::call_service(&app, record("week-4", 11)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
