use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single failed attempt record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u8,
    /// Error message from the failed attempt.
    pub error: String,
    /// When this attempt occurred.
    pub timestamp: DateTime<Utc>,
}

impl RetryAttempt {
    pub fn new(attempt: u8, error: impl Into<String>) -> Self {
        Self {
            attempt,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of recording a failure against a [`RetryBudget`].
#[derive(Debug, Clone)]
pub enum RetryDecision {
    Retry { attempt: u8 },
    Exhausted { history: Vec<RetryAttempt> },
}

/// Bounded attempt counter for a single operation.
#[derive(Debug)]
pub struct RetryBudget {
    max_attempts: u8,
    history: Vec<RetryAttempt>,
}

impl RetryBudget {
    /// Allow at most `max_attempts` attempts in total (at least one).
    pub fn new(max_attempts: u8) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            history: Vec::new(),
        }
    }

    /// Record a failed attempt and decide whether another one is allowed.
    pub fn record_failure(&mut self, error: &str) -> RetryDecision {
        let attempt = self.history.len() as u8 + 1;
        self.history.push(RetryAttempt::new(attempt, error));

        if attempt < self.max_attempts {
            RetryDecision::Retry { attempt }
        } else {
            RetryDecision::Exhausted {
                history: std::mem::take(&mut self.history),
            }
        }
    }

    /// Number of failures recorded so far.
    pub fn failures(&self) -> usize {
        self.history.len()
    }

    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }
}
