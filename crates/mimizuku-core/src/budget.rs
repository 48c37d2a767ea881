//! Cooperative cancellation and time budgets.

use crate::error::{ReasonerError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag a caller raises to stop a running check.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Deadline plus cancellation flag, polled once per rule application.
///
/// An interrupted consistency check keeps its completion graph, and the
/// next check with a fresh budget resumes it. An interrupted concept test
/// (satisfiability, subsumption, instance check) runs on a throwaway graph
/// and caches nothing; retrying it starts over.
#[derive(Debug, Clone)]
pub struct ReasoningBudget {
    started: Instant,
    timeout: Option<Duration>,
    flag: CancellationFlag,
}

impl Default for ReasoningBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl ReasoningBudget {
    pub fn unlimited() -> Self {
        Self {
            started: Instant::now(),
            timeout: None,
            flag: CancellationFlag::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::unlimited()
        }
    }

    pub fn with_flag(mut self, flag: CancellationFlag) -> Self {
        self.flag = flag;
        self
    }

    pub fn flag(&self) -> &CancellationFlag {
        &self.flag
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Starts the clock again, keeping the timeout and flag.
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn check(&self) -> Result<()> {
        if self.flag.is_cancelled() {
            return Err(ReasonerError::Cancelled);
        }
        if let Some(timeout) = self.timeout {
            let elapsed = self.elapsed();
            if elapsed >= timeout {
                return Err(ReasonerError::Timeout { elapsed });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_never_fails() {
        assert!(ReasoningBudget::unlimited().check().is_ok());
    }

    #[test]
    fn test_zero_timeout_expires() {
        let budget = ReasoningBudget::with_timeout(Duration::ZERO);
        assert!(matches!(budget.check(), Err(ReasonerError::Timeout { .. })));
    }

    #[test]
    fn test_cancellation_is_shared() {
        let flag = CancellationFlag::new();
        let budget = ReasoningBudget::unlimited().with_flag(flag.clone());
        flag.cancel();
        assert_eq!(budget.check(), Err(ReasonerError::Cancelled));
        flag.reset();
        assert!(budget.check().is_ok());
    }
}
