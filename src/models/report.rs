//! Probe outcomes and the ordered diagnostic report

use crate::{
    error::{AppError, Result},
    types::{format_duration, ProbeStatus},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one probe within one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Catalog-assigned name, unique within a report
    pub name: String,
    /// True only when `status` is [`ProbeStatus::Passed`]
    pub success: bool,
    pub status: ProbeStatus,
    /// Human-readable explanation; never empty
    pub detail: String,
    /// Heuristic or estimated result rather than a protocol-level check
    pub approximate: bool,
    /// Wall time spent in the probe
    pub elapsed_ms: u64,
}

impl ProbeOutcome {
    fn build(name: String, status: ProbeStatus, detail: String) -> Self {
        let detail = if detail.trim().is_empty() {
            match status {
                ProbeStatus::Passed => format!("{} passed", name),
                ProbeStatus::Failed => format!("{} failed without further information", name),
                ProbeStatus::TimedOut => format!("{} timed out", name),
                ProbeStatus::NotApplicable => format!("{} does not apply to this target", name),
            }
        } else {
            detail
        };

        Self {
            name,
            success: status.is_success(),
            status,
            detail,
            approximate: false,
            elapsed_ms: 0,
        }
    }

    pub fn passed<N: Into<String>, D: Into<String>>(name: N, detail: D) -> Self {
        Self::build(name.into(), ProbeStatus::Passed, detail.into())
    }

    pub fn failed<N: Into<String>, D: Into<String>>(name: N, detail: D) -> Self {
        Self::build(name.into(), ProbeStatus::Failed, detail.into())
    }

    pub fn timed_out<N: Into<String>, D: Into<String>>(name: N, detail: D) -> Self {
        Self::build(name.into(), ProbeStatus::TimedOut, detail.into())
    }

    pub fn not_applicable<N: Into<String>, D: Into<String>>(name: N, detail: D) -> Self {
        Self::build(name.into(), ProbeStatus::NotApplicable, detail.into())
    }

    /// Convert a probe's internal result; timeouts keep their own status
    pub fn from_result<N: Into<String>>(name: N, result: Result<String>) -> Self {
        match result {
            Ok(detail) => Self::passed(name, detail),
            Err(error) if error.is_timeout() => Self::timed_out(name, error.message()),
            Err(error) => Self::failed(name, error.message()),
        }
    }

    /// Mark the outcome as an approximation
    pub fn approximate(mut self) -> Self {
        self.approximate = true;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Ordered outcomes of one diagnostic run, in catalog order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Target URL the run was executed against
    pub target: String,
    pub outcomes: Vec<ProbeOutcome>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl Report {
    pub fn new(target: String, outcomes: Vec<ProbeOutcome>, started_at: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            target,
            outcomes,
            started_at,
            duration_ms: duration.as_millis().min(u64::MAX as u128) as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeOutcome> {
        self.outcomes.iter()
    }

    /// Look up an outcome by probe name
    pub fn get(&self, name: &str) -> Option<&ProbeOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.outcomes.iter().map(|outcome| outcome.name.as_str()).collect()
    }

    pub fn passed_count(&self) -> usize {
        self.count_status(ProbeStatus::Passed)
    }

    /// Failed and timed-out outcomes; not-applicable ones are excluded
    pub fn failed_count(&self) -> usize {
        self.count_status(ProbeStatus::Failed) + self.count_status(ProbeStatus::TimedOut)
    }

    pub fn not_applicable_count(&self) -> usize {
        self.count_status(ProbeStatus::NotApplicable)
    }

    /// Every applicable probe passed
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// One-line summary, e.g. `7 passed, 1 failed, 1 not applicable in 2.3s`
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} not applicable in {}",
            self.passed_count(),
            self.failed_count(),
            self.not_applicable_count(),
            format_duration(self.duration())
        )
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::internal(format!("Failed to serialize report: {}", e)))
    }

    fn count_status(&self, status: ProbeStatus) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.status == status).count()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ProbeOutcome;
    type IntoIter = std::slice::Iter<'a, ProbeOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
