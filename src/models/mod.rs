// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AnalysisSignals, AttemptStatus, DeveloperProfile, Experience, ExperienceLevel, Grade,
    GradeBreakdown, GradeResult, MatchResult, MatchWeights, ProjectListing, RubricPoints,
    ScoredListing, SubmissionAttempt, SubmissionKind,
};
pub use requests::{
    ChallengeResultRequest, GradeSubmissionRequest, HistoryQuery, RecommendRequest,
    ScoreMatchRequest, UpsertListingRequest, UpsertProfileRequest,
};
pub use responses::{
    ChallengeResultResponse, ErrorResponse, GradeSubmissionResponse, HealthResponse,
    HistoryResponse, RecommendResponse, ScoreMatchResponse,
};
