use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::{AttemptHistory, HistoryError};
use crate::models::{DeveloperProfile, ProjectListing, SubmissionAttempt, SubmissionKind};

/// Errors that can occur with store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Listing {0} is archived")]
    Archived(String),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Counters returned after appending an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub attempts: usize,
    pub failed: usize,
    pub consecutive_failures: usize,
}

/// Challenge bookkeeping for one developer
#[derive(Debug, Clone, Default)]
struct ChallengeProgress {
    passed: HashSet<String>,
    points: u32,
}

/// Stored value with the version it was written at
#[derive(Debug, Clone)]
struct Versioned<T> {
    value: T,
    version: u64,
}

/// In-memory store for profiles, listings and attempt histories
///
/// Histories are keyed by (developer, submission kind) and only ever grow.
/// Every profile or listing write takes a fresh version from one counter.
#[derive(Debug, Default)]
pub struct Store {
    next_version: AtomicU64,
    profiles: RwLock<HashMap<String, Versioned<DeveloperProfile>>>,
    listings: RwLock<HashMap<String, Versioned<ProjectListing>>>,
    histories: RwLock<HashMap<(String, SubmissionKind), AttemptHistory>>,
    challenges: RwLock<HashMap<String, ChallengeProgress>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_version(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Insert or replace a profile. Returns true if it was new.
    pub async fn upsert_profile(&self, profile: DeveloperProfile) -> bool {
        let mut profiles = self.profiles.write().await;
        let version = self.bump_version();
        profiles
            .insert(
                profile.developer_id.clone(),
                Versioned {
                    value: profile,
                    version,
                },
            )
            .is_none()
    }

    pub async fn get_profile(&self, developer_id: &str) -> Result<DeveloperProfile, StoreError> {
        self.get_profile_versioned(developer_id)
            .await
            .map(|(profile, _)| profile)
    }

    /// Profile together with the version it was last written at
    pub async fn get_profile_versioned(
        &self,
        developer_id: &str,
    ) -> Result<(DeveloperProfile, u64), StoreError> {
        self.profiles
            .read()
            .await
            .get(developer_id)
            .map(|v| (v.value.clone(), v.version))
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", developer_id)))
    }

    /// Publish a listing or update its requirements
    ///
    /// Identity (project, owner, creation time) never changes after the
    /// first insert, and archived listings are frozen.
    pub async fn upsert_listing(&self, listing: ProjectListing) -> Result<ProjectListing, StoreError> {
        let mut listings = self.listings.write().await;

        if let Some(existing) = listings.get_mut(&listing.listing_id) {
            if existing.value.archived {
                return Err(StoreError::Archived(listing.listing_id));
            }
            existing.value.topic = listing.topic;
            existing.value.required_languages = listing.required_languages;
            existing.value.required_experience = listing.required_experience;
            existing.version = self.bump_version();
            return Ok(existing.value.clone());
        }

        let version = self.bump_version();
        listings.insert(
            listing.listing_id.clone(),
            Versioned {
                value: listing.clone(),
                version,
            },
        );
        Ok(listing)
    }

    pub async fn archive_listing(&self, listing_id: &str) -> Result<(), StoreError> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .get_mut(listing_id)
            .ok_or_else(|| StoreError::NotFound(format!("listing {}", listing_id)))?;
        listing.value.archived = true;
        listing.version = self.bump_version();
        Ok(())
    }

    pub async fn get_listing(&self, listing_id: &str) -> Result<ProjectListing, StoreError> {
        self.get_listing_versioned(listing_id)
            .await
            .map(|(listing, _)| listing)
    }

    /// Listing together with the version it was last written at
    pub async fn get_listing_versioned(
        &self,
        listing_id: &str,
    ) -> Result<(ProjectListing, u64), StoreError> {
        self.listings
            .read()
            .await
            .get(listing_id)
            .map(|v| (v.value.clone(), v.version))
            .ok_or_else(|| StoreError::NotFound(format!("listing {}", listing_id)))
    }

    pub async fn listings(&self) -> Vec<ProjectListing> {
        self.listings
            .read()
            .await
            .values()
            .map(|v| v.value.clone())
            .collect()
    }

    /// Append a graded attempt to its history
    ///
    /// Attempts are ordered by arrival here: `submitted_at` is re-stamped
    /// under the write lock, so grading that finishes late never lands
    /// before an attempt that was already recorded.
    pub async fn append_attempt(&self, mut attempt: SubmissionAttempt) -> Result<HistoryStats, StoreError> {
        let key = (attempt.developer_id.clone(), attempt.kind);
        let mut histories = self.histories.write().await;
        let history = histories
            .entry(key)
            .or_insert_with(|| AttemptHistory::new(attempt.developer_id.clone(), attempt.kind));

        let now = Utc::now();
        attempt.submitted_at = match history.attempts().last() {
            Some(last) if last.submitted_at > now => last.submitted_at,
            _ => now,
        };

        history.append(attempt)?;

        Ok(HistoryStats {
            attempts: history.len(),
            failed: history.failed_count(),
            consecutive_failures: history.consecutive_failures(),
        })
    }

    /// Snapshot of a history; empty if nothing was submitted yet
    pub async fn history(&self, developer_id: &str, kind: SubmissionKind) -> AttemptHistory {
        self.histories
            .read()
            .await
            .get(&(developer_id.to_string(), kind))
            .cloned()
            .unwrap_or_else(|| AttemptHistory::new(developer_id, kind))
    }

    /// Record a weekly challenge result and return accumulated points
    ///
    /// Only passed challenges count, each challenge at most once.
    pub async fn record_challenge(
        &self,
        developer_id: &str,
        challenge_id: &str,
        points: u32,
        passed: bool,
    ) -> u32 {
        let mut challenges = self.challenges.write().await;
        let progress = challenges.entry(developer_id.to_string()).or_default();

        if passed && progress.passed.insert(challenge_id.to_string()) {
            progress.points += points;
        }

        progress.points
    }
}
