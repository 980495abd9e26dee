use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{
    GradeResult, MatchResult, ScoredListing, SubmissionAttempt, SubmissionKind,
};

/// Response for the score endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreMatchResponse {
    #[serde(rename = "developerId")]
    pub developer_id: String,
    #[serde(rename = "listingId")]
    pub listing_id: String,
    #[serde(flatten)]
    pub result: MatchResult,
    pub displayable: bool,
    pub cached: bool,
}

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub matches: Vec<ScoredListing>,
    pub total_results: usize,
    pub skipped_invalid: usize,
}

/// Response for the grade endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSubmissionResponse {
    #[serde(rename = "attemptId")]
    pub attempt_id: Uuid,
    pub kind: SubmissionKind,
    #[serde(flatten)]
    pub result: GradeResult,
    #[serde(rename = "failedAttempts")]
    pub failed_attempts: usize,
    #[serde(rename = "learningSupport")]
    pub learning_support: bool,
}

/// Response for the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(rename = "developerId")]
    pub developer_id: String,
    pub kind: SubmissionKind,
    pub attempts: Vec<SubmissionAttempt>,
    #[serde(rename = "failedAttempts")]
    pub failed_attempts: usize,
    #[serde(rename = "consecutiveFailures")]
    pub consecutive_failures: usize,
    #[serde(rename = "learningSupport")]
    pub learning_support: bool,
}

/// Response for the weekly challenge endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResultResponse {
    #[serde(rename = "developerId")]
    pub developer_id: String,
    #[serde(rename = "challengeId")]
    pub challenge_id: String,
    pub score: u32,
    pub passed: bool,
    #[serde(rename = "accumulatedPoints")]
    pub accumulated_points: u32,
    #[serde(rename = "skillMapUnlocked")]
    pub skill_map_unlocked: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
