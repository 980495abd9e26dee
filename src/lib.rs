//! TechSync Match - scoring engine for the TechSync collaboration platform
//!
//! This library scores developer/project compatibility, grades code
//! submissions against a fixed rubric, and applies the pass thresholds
//! that gate joining projects, task approval and weekly challenges.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{AutomationGrader, HeuristicAnalyzer, MatchScorer, Matcher, StaticAnalyzer, ThresholdGate};
pub use error::{Result, ScoringError};
pub use models::{
    AnalysisSignals, DeveloperProfile, Experience, ExperienceLevel, GradeResult, MatchResult,
    MatchWeights, ProjectListing, SubmissionAttempt, SubmissionKind,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let gate = ThresholdGate::default();
        assert!(gate.can_join_project(70.0));
        assert!(MatchWeights::default().validate().is_ok());
    }
}
