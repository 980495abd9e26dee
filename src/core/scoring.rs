use crate::core::filters::calculate_language_overlap;
use crate::core::language::normalize_language;
use crate::error::{Result, ScoringError};
use crate::models::{DeveloperProfile, ExperienceLevel, MatchResult, MatchWeights, ProjectListing};

/// Points lost per experience band between developer and listing
pub const DEFAULT_EXPERIENCE_DECAY: f64 = 40.0;

/// Computes the 0-100 compatibility between a developer and a listing
///
/// Scoring formula:
/// total = (
///     topic_score * 0.40 +         # listing topic is one of the developer's interests
///     experience_score * 0.30 +    # 100 - decay * |level delta|
///     language_score * 0.30        # share of required languages the developer knows
/// )
#[derive(Debug, Clone, Copy)]
pub struct MatchScorer {
    weights: MatchWeights,
    experience_decay: f64,
}

impl MatchScorer {
    pub fn new(weights: MatchWeights, experience_decay: f64) -> Result<Self> {
        weights.validate()?;
        if !experience_decay.is_finite() || experience_decay <= 0.0 {
            return Err(ScoringError::InvalidWeights(format!(
                "experience decay must be positive, got {}",
                experience_decay
            )));
        }
        Ok(Self {
            weights,
            experience_decay,
        })
    }

    pub fn weights(&self) -> MatchWeights {
        self.weights
    }

    /// Score one (profile, listing) pair. Pure: no caching, no logging.
    pub fn score(&self, profile: &DeveloperProfile, listing: &ProjectListing) -> Result<MatchResult> {
        if profile.languages.iter().all(|l| l.trim().is_empty()) {
            return Err(ScoringError::InvalidProfile(format!(
                "profile {} has no programming languages",
                profile.developer_id
            )));
        }
        if listing.topic.trim().is_empty() {
            return Err(ScoringError::InvalidListing(format!(
                "listing {} has no topic category",
                listing.listing_id
            )));
        }

        let topic_score = calculate_topic_score(&profile.topics, &listing.topic);
        let experience_score = calculate_experience_score(
            profile.experience.level(),
            listing.required_experience,
            self.experience_decay,
        );
        let (coverage, _, _) = calculate_language_overlap(profile, listing);
        let language_score = coverage * 100.0;

        let total_score = topic_score * self.weights.topic
            + experience_score * self.weights.experience
            + language_score * self.weights.language;

        Ok(MatchResult {
            topic_score,
            experience_score,
            language_score,
            total_score: total_score.clamp(0.0, 100.0),
        })
    }
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self {
            weights: MatchWeights::default(),
            experience_decay: DEFAULT_EXPERIENCE_DECAY,
        }
    }
}

/// Binary topic score: 100 on an exact (case-insensitive) match, else 0
#[inline]
pub fn calculate_topic_score(interests: &[String], topic: &str) -> f64 {
    let wanted = topic.trim().to_lowercase();
    if interests.iter().any(|t| t.trim().to_lowercase() == wanted) {
        100.0
    } else {
        0.0
    }
}

/// Linear decay by number of experience bands apart, clamped to [0, 100]
#[inline]
pub fn calculate_experience_score(
    developer: ExperienceLevel,
    required: ExperienceLevel,
    decay: f64,
) -> f64 {
    let delta = developer.distance(required) as f64;
    (100.0 - decay * delta).clamp(0.0, 100.0)
}

/// Language score on its own, for callers that only have name lists
#[inline]
pub fn calculate_language_score(known: &[String], required: &[String]) -> f64 {
    let known: std::collections::HashSet<String> =
        known.iter().map(|l| normalize_language(l)).collect();
    let required: std::collections::HashSet<String> = required
        .iter()
        .map(|l| normalize_language(l))
        .filter(|l| !l.is_empty())
        .collect();

    if required.is_empty() {
        return 100.0;
    }

    let covered = required.iter().filter(|l| known.contains(*l)).count();
    100.0 * covered as f64 / required.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Experience;
    use chrono::Utc;

    fn create_test_profile(level: ExperienceLevel) -> DeveloperProfile {
        DeveloperProfile {
            developer_id: "dev".to_string(),
            languages: vec!["Python".to_string(), "JS".to_string(), "Go".to_string()],
            topics: vec!["AI".to_string()],
            experience: Experience::Level(level),
        }
    }

    fn create_test_listing(topic: &str, required: &[&str], level: ExperienceLevel) -> ProjectListing {
        ProjectListing {
            listing_id: "listing".to_string(),
            project_id: "project".to_string(),
            owner_id: "owner".to_string(),
            topic: topic.to_string(),
            required_languages: required.iter().map(|l| l.to_string()).collect(),
            required_experience: level,
            created_at: Utc::now(),
            archived: false,
        }
    }

    #[test]
    fn test_exact_match_scores_100() {
        let scorer = MatchScorer::default();
        let profile = create_test_profile(ExperienceLevel::Intermediate);
        let listing = create_test_listing("AI", &["Python", "JS"], ExperienceLevel::Intermediate);

        let result = scorer.score(&profile, &listing).unwrap();

        assert_eq!(result.topic_score, 100.0);
        assert_eq!(result.experience_score, 100.0);
        assert_eq!(result.language_score, 100.0);
        assert_eq!(result.total_score, 100.0);
    }

    #[test]
    fn test_total_is_weighted_sum() {
        let scorer = MatchScorer::default();
        let profile = create_test_profile(ExperienceLevel::Beginner);
        let listing = create_test_listing("Web", &["Python", "Rust", "Go"], ExperienceLevel::Advanced);

        let r = scorer.score(&profile, &listing).unwrap();
        let expected = 0.4 * r.topic_score + 0.3 * r.experience_score + 0.3 * r.language_score;

        assert!((r.total_score - expected).abs() < 1e-9);
        assert_eq!(r.topic_score, 0.0);
        assert_eq!(r.experience_score, 20.0);
        assert!((r.language_score - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_topic_score_case_insensitive() {
        let interests = vec!["Machine Learning".to_string()];
        assert_eq!(calculate_topic_score(&interests, "machine learning"), 100.0);
        assert_eq!(calculate_topic_score(&interests, "AI"), 0.0);
    }

    #[test]
    fn test_experience_score_decays() {
        let exact = calculate_experience_score(ExperienceLevel::Advanced, ExperienceLevel::Advanced, 40.0);
        let one_off = calculate_experience_score(ExperienceLevel::Intermediate, ExperienceLevel::Advanced, 40.0);
        let two_off = calculate_experience_score(ExperienceLevel::Expert, ExperienceLevel::Intermediate, 40.0);
        let three_off = calculate_experience_score(ExperienceLevel::Beginner, ExperienceLevel::Expert, 40.0);

        assert_eq!(exact, 100.0);
        assert_eq!(one_off, 60.0);
        assert_eq!(two_off, 20.0);
        assert_eq!(three_off, 0.0);
    }

    #[test]
    fn test_empty_required_languages_score_100() {
        assert_eq!(calculate_language_score(&["Rust".to_string()], &[]), 100.0);
    }

    #[test]
    fn test_empty_profile_languages_rejected() {
        let scorer = MatchScorer::default();
        let mut profile = create_test_profile(ExperienceLevel::Expert);
        profile.languages.clear();
        let listing = create_test_listing("AI", &[], ExperienceLevel::Expert);

        assert!(matches!(
            scorer.score(&profile, &listing),
            Err(ScoringError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_missing_topic_rejected() {
        let scorer = MatchScorer::default();
        let profile = create_test_profile(ExperienceLevel::Expert);
        let listing = create_test_listing("  ", &["Python"], ExperienceLevel::Expert);

        assert!(matches!(
            scorer.score(&profile, &listing),
            Err(ScoringError::InvalidListing(_))
        ));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = MatchWeights { topic: 0.6, experience: 0.3, language: 0.3 };
        assert!(MatchScorer::new(weights, DEFAULT_EXPERIENCE_DECAY).is_err());
        assert!(MatchScorer::new(MatchWeights::default(), 0.0).is_err());
    }
}
