//! Token usage accounting across provider calls

use serde::Serialize;
use std::sync::Mutex;
use tracing::debug;

use super::TokenUsage;

/// Accumulated usage for the lifetime of a tracker
#[derive(Debug, Default)]
struct Totals {
    calls: u64,
    prompt_tokens: u64,
    completion_tokens: u64,
    history: Vec<TokenUsage>,
}

/// Tracks per-call token usage for every completion made through a client
#[derive(Debug, Default)]
pub struct UsageTracker {
    totals: Mutex<Totals>,
}

/// Snapshot of accumulated usage
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UsageSummary {
    pub total_calls: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub average_tokens_per_call: f64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the usage of one completed call
    pub fn record(&self, usage: &TokenUsage) {
        let mut totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        totals.calls += 1;
        totals.prompt_tokens += usage.prompt_tokens;
        totals.completion_tokens += usage.completion_tokens;
        totals.history.push(*usage);
        debug!(
            calls = totals.calls,
            total_tokens = totals.prompt_tokens + totals.completion_tokens,
            "UsageTracker::record: called"
        );
    }

    /// Summarize everything recorded so far
    pub fn summary(&self) -> UsageSummary {
        let totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        let total_tokens = totals.prompt_tokens + totals.completion_tokens;
        let average_tokens_per_call = if totals.calls > 0 {
            total_tokens as f64 / totals.calls as f64
        } else {
            0.0
        };

        UsageSummary {
            total_calls: totals.calls,
            prompt_tokens: totals.prompt_tokens,
            completion_tokens: totals.completion_tokens,
            total_tokens,
            average_tokens_per_call,
        }
    }

    /// Per-call usage in the order calls completed
    pub fn history(&self) -> Vec<TokenUsage> {
        let totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        totals.history.clone()
    }

    /// Clear all recorded usage
    pub fn reset(&self) {
        let mut totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        *totals = Totals::default();
        debug!("UsageTracker::reset: called");
    }
}
