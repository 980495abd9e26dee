use std::collections::HashSet;

use crate::core::language::{language_set, normalize_language};
use crate::models::{DeveloperProfile, ProjectListing};

/// Check whether a listing may be recommended to a developer at all
///
/// This is the pre-filter stage of the recommendation pipeline.
#[inline]
pub fn is_recommendable(
    listing: &ProjectListing,
    profile: &DeveloperProfile,
    exclude_listing_ids: &[String],
) -> bool {
    // Archived listings no longer accept developers
    if listing.archived {
        return false;
    }

    // Developers are never recommended their own projects
    if listing.owner_id == profile.developer_id {
        return false;
    }

    if exclude_listing_ids.contains(&listing.listing_id) {
        return false;
    }

    true
}

/// Overlap between the listing's required languages and what the developer knows
///
/// Returns the coverage fraction (0.0 to 1.0) along with the shared and
/// missing languages in the listing's order. An empty requirement is fully
/// covered.
pub fn calculate_language_overlap(
    profile: &DeveloperProfile,
    listing: &ProjectListing,
) -> (f64, Vec<String>, Vec<String>) {
    let known = language_set(&profile.languages);

    let mut seen = HashSet::new();
    let mut shared = Vec::new();
    let mut missing = Vec::new();

    for language in &listing.required_languages {
        let normalized = normalize_language(language);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }
        if known.contains(&normalized) {
            shared.push(normalized);
        } else {
            missing.push(normalized);
        }
    }

    let required = shared.len() + missing.len();
    if required == 0 {
        return (1.0, shared, missing);
    }

    (shared.len() as f64 / required as f64, shared, missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Experience, ExperienceLevel};
    use chrono::Utc;

    fn create_test_profile(languages: &[&str]) -> DeveloperProfile {
        DeveloperProfile {
            developer_id: "dev_1".to_string(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            topics: vec!["AI".to_string()],
            experience: Experience::Level(ExperienceLevel::Intermediate),
        }
    }

    fn create_test_listing(required: &[&str]) -> ProjectListing {
        ProjectListing {
            listing_id: "listing_1".to_string(),
            project_id: "project_1".to_string(),
            owner_id: "owner_1".to_string(),
            topic: "AI".to_string(),
            required_languages: required.iter().map(|l| l.to_string()).collect(),
            required_experience: ExperienceLevel::Intermediate,
            created_at: Utc::now(),
            archived: false,
        }
    }

    #[test]
    fn test_recommendable_open_listing() {
        let profile = create_test_profile(&["Python", "Go", "Rust"]);
        let listing = create_test_listing(&["Python"]);

        assert!(is_recommendable(&listing, &profile, &[]));
    }

    #[test]
    fn test_archived_listing_filtered() {
        let profile = create_test_profile(&["Python", "Go", "Rust"]);
        let mut listing = create_test_listing(&["Python"]);
        listing.archived = true;

        assert!(!is_recommendable(&listing, &profile, &[]));
    }

    #[test]
    fn test_own_listing_filtered() {
        let profile = create_test_profile(&["Python", "Go", "Rust"]);
        let mut listing = create_test_listing(&["Python"]);
        listing.owner_id = profile.developer_id.clone();

        assert!(!is_recommendable(&listing, &profile, &[]));
    }

    #[test]
    fn test_excluded_listing_filtered() {
        let profile = create_test_profile(&["Python", "Go", "Rust"]);
        let listing = create_test_listing(&["Python"]);

        assert!(!is_recommendable(&listing, &profile, &["listing_1".to_string()]));
    }

    #[test]
    fn test_language_overlap_partial() {
        let profile = create_test_profile(&["Python", "JS", "Go"]);
        let listing = create_test_listing(&["python", "Rust", "TypeScript", "javascript"]);

        let (coverage, shared, missing) = calculate_language_overlap(&profile, &listing);

        assert_eq!(coverage, 0.5);
        assert_eq!(shared, vec!["python", "javascript"]);
        assert_eq!(missing, vec!["rust", "typescript"]);
    }

    #[test]
    fn test_language_overlap_empty_requirement() {
        let profile = create_test_profile(&["Python"]);
        let listing = create_test_listing(&[]);

        let (coverage, shared, missing) = calculate_language_overlap(&profile, &listing);

        assert_eq!(coverage, 1.0);
        assert!(shared.is_empty());
        assert!(missing.is_empty());
    }
}
