// Service exports
pub mod analyzer;
pub mod cache;
pub mod store;

pub use analyzer::{AnalyzerBackend, AnalyzerError, RemoteAnalyzerClient};
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use store::{HistoryStats, Store, StoreError};
