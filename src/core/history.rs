use thiserror::Error;

use crate::models::{SubmissionAttempt, SubmissionKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("attempt belongs to {actual}, history is for {expected}")]
    WrongOwner { expected: String, actual: String },

    #[error("attempt kind {actual} does not match history kind {expected}")]
    WrongKind {
        expected: SubmissionKind,
        actual: SubmissionKind,
    },

    #[error("attempt {0} was submitted before the latest recorded attempt")]
    OutOfOrder(String),
}

/// Append-only attempts of one developer for one submission kind
///
/// Failures are cumulative: a later success never erases them.
#[derive(Debug, Clone)]
pub struct AttemptHistory {
    developer_id: String,
    kind: SubmissionKind,
    attempts: Vec<SubmissionAttempt>,
}

impl AttemptHistory {
    pub fn new(developer_id: impl Into<String>, kind: SubmissionKind) -> Self {
        Self {
            developer_id: developer_id.into(),
            kind,
            attempts: Vec::new(),
        }
    }

    pub fn developer_id(&self) -> &str {
        &self.developer_id
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    /// Append in submission order
    pub fn append(&mut self, attempt: SubmissionAttempt) -> Result<(), HistoryError> {
        if attempt.developer_id != self.developer_id {
            return Err(HistoryError::WrongOwner {
                expected: self.developer_id.clone(),
                actual: attempt.developer_id,
            });
        }
        if attempt.kind != self.kind {
            return Err(HistoryError::WrongKind {
                expected: self.kind,
                actual: attempt.kind,
            });
        }
        if let Some(last) = self.attempts.last() {
            if attempt.submitted_at < last.submitted_at {
                return Err(HistoryError::OutOfOrder(attempt.attempt_id.to_string()));
            }
        }

        self.attempts.push(attempt);
        Ok(())
    }

    pub fn attempts(&self) -> &[SubmissionAttempt] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_failed()).count()
    }

    /// Failures since the most recent pass
    pub fn consecutive_failures(&self) -> usize {
        self.attempts
            .iter()
            .rev()
            .take_while(|a| !a.is_passed())
            .filter(|a| a.is_failed())
            .count()
    }

    pub fn has_passed(&self) -> bool {
        self.attempts.iter().any(|a| a.is_passed())
    }
}
