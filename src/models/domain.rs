use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Result, ScoringError};

/// Self-reported or required experience band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ExperienceLevel {
    pub fn rank(&self) -> u8 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
            Self::Expert => 3,
        }
    }

    /// Band a number of years of experience
    pub fn from_years(years: u32) -> Self {
        match years {
            0..=1 => Self::Beginner,
            2..=4 => Self::Intermediate,
            5..=9 => Self::Advanced,
            _ => Self::Expert,
        }
    }

    /// Number of bands between two levels
    pub fn distance(&self, other: ExperienceLevel) -> u8 {
        self.rank().abs_diff(other.rank())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            other => Err(format!("unknown experience level: {}", other)),
        }
    }
}

/// Experience as stored on a profile: either raw years or an explicit band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Experience {
    Years(u32),
    Level(ExperienceLevel),
}

impl Experience {
    pub fn level(&self) -> ExperienceLevel {
        match self {
            Experience::Years(years) => ExperienceLevel::from_years(*years),
            Experience::Level(level) => *level,
        }
    }
}

/// Developer profile used for matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperProfile {
    #[serde(rename = "developerId")]
    pub developer_id: String,
    pub languages: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub experience: Experience,
}

/// Project listing published by a project manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListing {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub topic: String,
    #[serde(rename = "requiredLanguages", default)]
    pub required_languages: Vec<String>,
    #[serde(rename = "requiredExperience")]
    pub required_experience: ExperienceLevel,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
}

/// Compatibility between one developer and one listing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "topicScore")]
    pub topic_score: f64,
    #[serde(rename = "experienceScore")]
    pub experience_score: f64,
    #[serde(rename = "languageScore")]
    pub language_score: f64,
    #[serde(rename = "totalScore")]
    pub total_score: f64,
}

impl MatchResult {
    /// Only results strictly above the threshold are shown to developers
    pub fn is_displayable(&self, threshold: f64) -> bool {
        self.total_score > threshold
    }
}

/// Recommended listing with its score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredListing {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
    pub topic: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub scores: MatchResult,
    #[serde(rename = "sharedLanguages")]
    pub shared_languages: Vec<String>,
    #[serde(rename = "missingLanguages")]
    pub missing_languages: Vec<String>,
}

/// Sub-score weights for the match total
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    pub topic: f64,
    pub experience: f64,
    pub language: f64,
}

impl MatchWeights {
    pub fn sum(&self) -> f64 {
        self.topic + self.experience + self.language
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic < 0.0 || self.experience < 0.0 || self.language < 0.0 {
            return Err(ScoringError::InvalidWeights(
                "weights must be non-negative".to_string(),
            ));
        }
        if (self.sum() - 1.0).abs() > 1e-6 {
            return Err(ScoringError::InvalidWeights(format!(
                "weights must sum to 1.0, got {}",
                self.sum()
            )));
        }
        Ok(())
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            topic: 0.40,
            experience: 0.30,
            language: 0.30,
        }
    }
}

/// What a submission is graded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    ProjectJoin,
    Task,
    WeeklyChallenge,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectJoin => "project_join",
            Self::Task => "task",
            Self::WeeklyChallenge => "weekly_challenge",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubmissionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "project_join" => Ok(Self::ProjectJoin),
            "task" => Ok(Self::Task),
            "weekly_challenge" => Ok(Self::WeeklyChallenge),
            other => Err(format!("unknown submission kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AttemptStatus {
    Pending,
    Graded { score: f64, passed: bool },
}

/// One graded (or about to be graded) piece of submitted code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionAttempt {
    #[serde(rename = "attemptId")]
    pub attempt_id: Uuid,
    #[serde(rename = "developerId")]
    pub developer_id: String,
    pub kind: SubmissionKind,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "sourceText", skip_serializing, default)]
    pub source_text: String,
    pub language: String,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
    pub status: AttemptStatus,
}

impl SubmissionAttempt {
    pub fn new(
        developer_id: impl Into<String>,
        kind: SubmissionKind,
        target_id: impl Into<String>,
        source_text: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            developer_id: developer_id.into(),
            kind,
            target_id: target_id.into(),
            source_text: source_text.into(),
            language: language.into(),
            submitted_at: Utc::now(),
            status: AttemptStatus::Pending,
        }
    }

    /// Move a pending attempt to graded. Graded attempts are immutable.
    pub fn record_grade(&mut self, score: f64, passed: bool) -> Result<()> {
        match self.status {
            AttemptStatus::Pending => {
                self.status = AttemptStatus::Graded { score, passed };
                Ok(())
            }
            AttemptStatus::Graded { .. } => {
                Err(ScoringError::AlreadyGraded(self.attempt_id.to_string()))
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, AttemptStatus::Graded { passed: false, .. })
    }

    pub fn is_passed(&self) -> bool {
        matches!(self.status, AttemptStatus::Graded { passed: true, .. })
    }
}

/// Raw signals extracted from source text by a static analyzer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSignals {
    pub language_match: bool,
    pub function_count: u32,
    pub control_structure_count: u32,
    pub comment_ratio: f64,
    pub complexity_score: f64,
    pub structure_score: f64,
}

/// Point budget per rubric dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricPoints {
    pub language_match: u32,
    pub functions: u32,
    pub logic: u32,
    pub documentation: u32,
    pub complexity: u32,
    pub structure: u32,
}

impl RubricPoints {
    pub fn total(&self) -> u32 {
        self.language_match
            + self.functions
            + self.logic
            + self.documentation
            + self.complexity
            + self.structure
    }
}

impl Default for RubricPoints {
    fn default() -> Self {
        Self {
            language_match: 20,
            functions: 25,
            logic: 20,
            documentation: 10,
            complexity: 15,
            structure: 10,
        }
    }
}

/// Points earned per rubric dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBreakdown {
    pub language_match: f64,
    pub functions: f64,
    pub logic: f64,
    pub documentation: f64,
    pub complexity: f64,
    pub structure: f64,
}

impl GradeBreakdown {
    pub fn sum(&self) -> f64 {
        self.language_match
            + self.functions
            + self.logic
            + self.documentation
            + self.complexity
            + self.structure
    }
}

/// Threshold-agnostic grading output
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub score: f64,
    pub breakdown: GradeBreakdown,
    pub feedback: Vec<String>,
}

/// Grade with the pass/fail decision applied for a submission kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    pub score: f64,
    pub passed: bool,
    pub breakdown: GradeBreakdown,
    pub feedback: Vec<String>,
    #[serde(rename = "automaticFail", default)]
    pub automatic_fail: bool,
}

impl GradeResult {
    /// Score-0 failure used when a submission cannot be analyzed at all
    pub fn automatic_fail(reason: &str) -> Self {
        Self {
            score: 0.0,
            passed: false,
            breakdown: GradeBreakdown::default(),
            feedback: vec![format!(
                "Your submission could not be analyzed ({}). Fix the syntax and try again.",
                reason
            )],
            automatic_fail: true,
        }
    }
}
