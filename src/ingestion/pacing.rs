//! # Request Pacing Module
//!
//! ## Purpose
//! Enforces the account-wide request ceiling by sleeping between requests.
//! The remote limit applies to the whole credential, not per connection, so a
//! single controller paces every request the engine issues.
//!
//! ## Contract
//! After `n` requests have been issued, `wait` guarantees that at least
//! `n * (3600 / ceiling)` seconds have elapsed since the budget was armed —
//! the strict cumulative reading of an hourly budget. The first request never
//! waits, which avoids division instability at startup. The budget is reset
//! at the start of every gather operation and never carried across
//! entity-type batches.
//!
//! The controller has no error paths; its only side effect is sleeping.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Process-wide pacing state for one gather invocation
#[derive(Debug, Clone)]
pub struct RateBudget {
    /// When the budget was armed
    pub started_at: Instant,
    /// Requests issued against this budget so far
    pub requests_issued: u64,
    /// Enforced ceiling in requests per hour
    pub ceiling_per_hour: u32,
}

impl RateBudget {
    /// Arm a fresh budget against the given hourly ceiling
    pub fn new(ceiling_per_hour: u32) -> Self {
        Self {
            started_at: Instant::now(),
            requests_issued: 0,
            ceiling_per_hour: ceiling_per_hour.max(1),
        }
    }

    /// Seconds that must separate consecutive requests on average
    pub fn target_interval(&self) -> Duration {
        Duration::from_secs_f64(3600.0 / f64::from(self.ceiling_per_hour))
    }
}

/// Paces requests against an hourly ceiling by sleeping before each request
/// beyond the first
#[derive(Debug)]
pub struct PacingController {
    budget: RateBudget,
}

impl PacingController {
    /// Create a controller with a fresh budget
    pub fn new(ceiling_per_hour: u32) -> Self {
        Self {
            budget: RateBudget::new(ceiling_per_hour),
        }
    }

    /// Discard the current budget and arm a fresh one. Called at the start of
    /// every gather operation.
    pub fn reset(&mut self) {
        self.budget = RateBudget::new(self.budget.ceiling_per_hour);
    }

    /// Requests recorded against the current budget
    pub fn requests_issued(&self) -> u64 {
        self.budget.requests_issued
    }

    /// Record one issued request and sleep long enough to keep the cumulative
    /// rate at or under the ceiling
    pub async fn wait(&mut self) {
        self.budget.requests_issued += 1;
        if self.budget.requests_issued == 1 {
            return;
        }

        let elapsed = self.budget.started_at.elapsed();
        let required = self
            .budget
            .target_interval()
            .mul_f64(self.budget.requests_issued as f64);

        if required > elapsed {
            let pause = required - elapsed;
            debug!(
                requests = self.budget.requests_issued,
                pause_ms = pause.as_millis() as u64,
                "pacing: sleeping to hold rate ceiling"
            );
            tokio::time::sleep(pause).await;
        }
    }
}
