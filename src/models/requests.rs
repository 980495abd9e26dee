use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::language::language_set;
use crate::models::domain::{
    DeveloperProfile, Experience, ExperienceLevel, ProjectListing, SubmissionKind,
};

/// Distinct languages a developer must list at onboarding
pub const MIN_ONBOARDING_LANGUAGES: usize = 3;

/// Request to create or replace a developer profile
///
/// Onboarding requires at least three distinct languages (aliases such as
/// "JS" and "javascript" count once); the scorer itself only rejects an
/// empty set.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "developer_id", rename = "developerId")]
    pub developer_id: String,
    #[validate(custom(function = "validate_distinct_languages"))]
    pub languages: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub experience: Experience,
}

impl From<UpsertProfileRequest> for DeveloperProfile {
    fn from(req: UpsertProfileRequest) -> Self {
        DeveloperProfile {
            developer_id: req.developer_id,
            languages: req.languages,
            topics: req.topics,
            experience: req.experience,
        }
    }
}

/// Request to publish a listing or change its requirements
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertListingRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "listing_id", rename = "listingId")]
    pub listing_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "project_id", rename = "projectId")]
    pub project_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "owner_id", rename = "ownerId")]
    pub owner_id: String,
    #[validate(length(min = 1), custom(function = "validate_not_blank"))]
    pub topic: String,
    #[serde(alias = "required_languages", rename = "requiredLanguages", default)]
    pub required_languages: Vec<String>,
    #[serde(alias = "required_experience", rename = "requiredExperience")]
    pub required_experience: ExperienceLevel,
    #[serde(alias = "created_at", rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UpsertListingRequest> for ProjectListing {
    fn from(req: UpsertListingRequest) -> Self {
        ProjectListing {
            listing_id: req.listing_id,
            project_id: req.project_id,
            owner_id: req.owner_id,
            topic: req.topic,
            required_languages: req.required_languages,
            required_experience: req.required_experience,
            created_at: req.created_at.unwrap_or_else(Utc::now),
            archived: false,
        }
    }
}

fn validate_distinct_languages(languages: &[String]) -> Result<(), ValidationError> {
    if language_set(languages).len() < MIN_ONBOARDING_LANGUAGES {
        let mut error = ValidationError::new("distinct_languages");
        error.message = Some(
            format!(
                "at least {} distinct programming languages are required",
                MIN_ONBOARDING_LANGUAGES
            )
            .into(),
        );
        return Err(error);
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request to score one developer against one listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "developer_id", rename = "developerId")]
    pub developer_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "listing_id", rename = "listingId")]
    pub listing_id: String,
}

/// Request for ranked listing recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "developer_id", rename = "developerId")]
    pub developer_id: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(alias = "exclude_listing_ids", rename = "excludeListingIds", default)]
    pub exclude_listing_ids: Vec<String>,
}

fn default_limit() -> u16 {
    20
}

/// Request to grade a join or task submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GradeSubmissionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "developer_id", rename = "developerId")]
    pub developer_id: String,
    pub kind: SubmissionKind,
    #[validate(length(min = 1))]
    #[serde(alias = "listing_id", rename = "listingId")]
    pub listing_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "source_text", rename = "sourceText")]
    pub source_text: String,
    #[validate(length(min = 1))]
    pub language: String,
}

/// Query string for attempt history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(alias = "developer_id", rename = "developerId")]
    pub developer_id: String,
    pub kind: SubmissionKind,
}

/// Request to record a weekly challenge outcome
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChallengeResultRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "developer_id", rename = "developerId")]
    pub developer_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "challenge_id", rename = "challengeId")]
    pub challenge_id: String,
    #[validate(range(max = 10))]
    pub score: u32,
}
