//! Whole-test retry policy
//!
//! A failed test execution may be re-run in full, with a fresh session, up
//! to a bounded number of times. The per-case state machine is the only
//! recovery mechanism for failures that escape the interaction layer.

use crate::config::Config;

/// Per-case retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-executions allowed beyond the first attempt
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// No re-execution: one attempt, whatever the outcome
    pub const fn none() -> Self {
        Self { max_retries: 0 }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_test_retries,
        }
    }

    /// Advance the state machine with the outcome of one finished execution.
    ///
    /// The finished attempt keeps its own outcome either way; the decision
    /// only says whether the whole case runs again.
    pub fn on_result(&self, state: RetryState, passed: bool) -> (RetryState, RetryDecision) {
        match state {
            RetryState::Attempting(n) => {
                if passed {
                    (RetryState::Passed, RetryDecision::Stop)
                } else if n < self.max_retries {
                    (RetryState::Attempting(n + 1), RetryDecision::Rerun)
                } else {
                    (RetryState::FailedFinal, RetryDecision::Stop)
                }
            }
            // Terminal states never schedule further executions
            terminal => (terminal, RetryDecision::Stop),
        }
    }
}

/// Lifecycle of one logical test run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Executing attempt `n` (zero-based; `n` counts consumed retries)
    Attempting(u32),
    /// A (possibly retried) execution succeeded
    Passed,
    /// The budget is spent and the last execution failed
    FailedFinal,
}

impl RetryState {
    pub fn initial() -> Self {
        RetryState::Attempting(0)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RetryState::Attempting(_))
    }
}

/// Whether the case is re-executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Rerun,
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_on_first_attempt() {
        let policy = RetryPolicy::new(2);

        let (state, decision) = policy.on_result(RetryState::initial(), true);
        assert_eq!(state, RetryState::Passed);
        assert_eq!(decision, RetryDecision::Stop);
    }

    #[test]
    fn test_fail_fail_pass_ends_passed_after_three_executions() {
        let policy = RetryPolicy::new(2);
        let mut state = RetryState::initial();
        let mut executions = 0;

        for outcome in [false, false, true] {
            executions += 1;
            let (next, decision) = policy.on_result(state, outcome);
            state = next;
            if decision == RetryDecision::Stop {
                break;
            }
        }

        assert_eq!(executions, 3);
        assert_eq!(state, RetryState::Passed);
    }

    #[test]
    fn test_all_failures_end_failed_final_with_no_fourth_execution() {
        let policy = RetryPolicy::new(2);
        let mut state = RetryState::initial();
        let mut executions = 0;

        loop {
            executions += 1;
            let (next, decision) = policy.on_result(state, false);
            state = next;
            if decision == RetryDecision::Stop {
                break;
            }
        }

        assert_eq!(executions, 3);
        assert_eq!(state, RetryState::FailedFinal);

        // A terminal state never schedules another run
        let (state, decision) = policy.on_result(state, false);
        assert_eq!(state, RetryState::FailedFinal);
        assert_eq!(decision, RetryDecision::Stop);
    }

    #[test]
    fn test_none_policy_stops_after_single_failure() {
        let policy = RetryPolicy::none();

        let (state, decision) = policy.on_result(RetryState::initial(), false);
        assert_eq!(state, RetryState::FailedFinal);
        assert_eq!(decision, RetryDecision::Stop);
    }

    #[test]
    fn test_success_is_terminal_even_after_retries() {
        let policy = RetryPolicy::new(2);

        let (state, _) = policy.on_result(RetryState::Attempting(2), true);
        assert_eq!(state, RetryState::Passed);
        assert!(state.is_terminal());
    }
}
