use thiserror::Error;

/// Validation failures raised by the scoring core.
///
/// None of these are transient: the core never retries and never returns a
/// partial result alongside one of them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("invalid listing: {0}")]
    InvalidListing(String),

    #[error("unparsable submission: {0}")]
    UnparsableSubmission(String),

    #[error("invalid rubric: points sum to {0}, expected 100")]
    InvalidRubric(u32),

    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("attempt {0} has already been graded")]
    AlreadyGraded(String),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
