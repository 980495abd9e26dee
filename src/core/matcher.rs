use std::cmp::Ordering;

use crate::core::{
    filters::{calculate_language_overlap, is_recommendable},
    scoring::MatchScorer,
};
use crate::error::{Result, ScoringError};
use crate::models::{DeveloperProfile, ProjectListing, ScoredListing};

/// Only listings scoring strictly above this are shown
pub const DEFAULT_DISPLAY_THRESHOLD: f64 = 70.0;

/// Result of the recommendation process
#[derive(Debug)]
pub struct RecommendationResult {
    pub matches: Vec<ScoredListing>,
    pub total_candidates: usize,
    pub skipped_invalid: usize,
}

/// Recommendation orchestrator - implements the listing pipeline
///
/// # Pipeline Stages
/// 1. Pre-filter (archived, own and excluded listings)
/// 2. Scoring
/// 3. Display threshold
/// 4. Ranking and truncation
#[derive(Debug, Clone)]
pub struct Matcher {
    scorer: MatchScorer,
    display_threshold: f64,
}

impl Matcher {
    pub fn new(scorer: MatchScorer, display_threshold: f64) -> Self {
        Self {
            scorer,
            display_threshold,
        }
    }

    pub fn with_default_scorer() -> Self {
        Self {
            scorer: MatchScorer::default(),
            display_threshold: DEFAULT_DISPLAY_THRESHOLD,
        }
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    pub fn display_threshold(&self) -> f64 {
        self.display_threshold
    }

    /// Recommend listings for a developer
    ///
    /// # Arguments
    /// * `profile` - The developer being matched
    /// * `listings` - All candidate listings
    /// * `limit` - Maximum number of recommendations to return
    /// * `exclude_listing_ids` - Listings the caller already showed or dismissed
    ///
    /// # Returns
    /// Ranked recommendations, or `InvalidProfile` if the profile itself
    /// cannot be scored. Listings that fail validation are skipped.
    pub fn recommend(
        &self,
        profile: &DeveloperProfile,
        listings: Vec<ProjectListing>,
        limit: usize,
        exclude_listing_ids: &[String],
    ) -> Result<RecommendationResult> {
        let total_candidates = listings.len();
        let mut skipped_invalid = 0;
        let mut matches = Vec::new();

        for listing in listings
            .into_iter()
            .filter(|listing| is_recommendable(listing, profile, exclude_listing_ids))
        {
            let scores = match self.scorer.score(profile, &listing) {
                Ok(scores) => scores,
                Err(ScoringError::InvalidListing(reason)) => {
                    tracing::warn!("Skipping listing {}: {}", listing.listing_id, reason);
                    skipped_invalid += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if !scores.is_displayable(self.display_threshold) {
                continue;
            }

            let (_, shared_languages, missing_languages) =
                calculate_language_overlap(profile, &listing);

            matches.push(ScoredListing {
                listing_id: listing.listing_id,
                project_id: listing.project_id,
                topic: listing.topic,
                created_at: listing.created_at,
                scores,
                shared_languages,
                missing_languages,
            });
        }

        matches.sort_by(rank_order);
        matches.truncate(limit);

        tracing::debug!(
            "Recommended {} of {} listings for {} ({} invalid)",
            matches.len(),
            total_candidates,
            profile.developer_id,
            skipped_invalid
        );

        Ok(RecommendationResult {
            matches,
            total_candidates,
            skipped_invalid,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_scorer()
    }
}

/// Score descending, newest listing first, then listing id for stability
fn rank_order(a: &ScoredListing, b: &ScoredListing) -> Ordering {
    b.scores
        .total_score
        .partial_cmp(&a.scores.total_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.listing_id.cmp(&b.listing_id))
}
