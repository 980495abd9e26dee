// Core algorithm exports
pub mod analysis;
pub mod filters;
pub mod gate;
pub mod grader;
pub mod history;
pub mod language;
pub mod matcher;
pub mod scoring;

pub use analysis::{HeuristicAnalyzer, StaticAnalyzer};
pub use filters::{calculate_language_overlap, is_recommendable};
pub use gate::ThresholdGate;
pub use grader::{AutomationGrader, SignalSaturation};
pub use history::{AttemptHistory, HistoryError};
pub use matcher::{Matcher, RecommendationResult};
pub use scoring::MatchScorer;
