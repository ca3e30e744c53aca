//! Diagnostic orchestration
//!
//! Runs every catalog entry in its own task, bounded by a semaphore, and
//! collects the outcomes into catalog order. Each task is a fault boundary:
//! a panicking probe becomes a `Failed` outcome and a hung probe becomes a
//! `TimedOut` outcome, without affecting its siblings. An overall deadline
//! bounds the whole run.

use crate::{
    defaults::{MAX_DIAGNOSTIC_DEADLINE, TIMEOUT_GRACE},
    logging::DiagnosticLogger,
    models::{Config, Endpoint, ProbeOutcome, Report},
    probes::{Probe, ProbeCatalog},
    types::format_duration,
};
use chrono::Utc;
use futures::FutureExt;
use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::{mpsc, Semaphore},
    time::Instant,
};

/// Fans a probe catalog out against one endpoint and assembles the report
#[derive(Clone)]
pub struct DiagnosticOrchestrator {
    max_concurrency: usize,
    deadline: Duration,
    grace: Duration,
    logger: DiagnosticLogger,
}

impl DiagnosticOrchestrator {
    pub fn new(max_concurrency: usize, deadline: Duration) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            deadline,
            grace: TIMEOUT_GRACE,
            logger: DiagnosticLogger::quiet(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_concurrency, config.deadline()).with_logger(DiagnosticLogger::new(config))
    }

    pub fn with_logger(mut self, logger: DiagnosticLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Slack granted past a probe's own budget before it is abandoned
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run the catalog against `endpoint`
    ///
    /// The report always holds exactly one outcome per catalog entry, in
    /// catalog order, whatever order the probes finish in.
    pub async fn diagnose(&self, endpoint: &Endpoint, catalog: &ProbeCatalog) -> Report {
        let started_at = Utc::now();
        let started = Instant::now();
        let run_deadline = started
            .checked_add(self.deadline)
            .unwrap_or_else(|| started + MAX_DIAGNOSTIC_DEADLINE);
        let total = catalog.len();
        let correlation_id = self.logger.log_run_started(&endpoint.url(), total).await;

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let (sender, mut receiver) = mpsc::channel::<(usize, ProbeOutcome)>(total.max(1));
        let mut handles = Vec::with_capacity(total);

        for (index, entry) in catalog.entries().iter().enumerate() {
            let probe = entry.probe.clone();
            let budget = entry.timeout;
            let grace = self.grace;
            let endpoint = endpoint.clone();
            let semaphore = semaphore.clone();
            let sender = sender.clone();

            handles.push(tokio::spawn(async move {
                // The probe's clock starts once it holds a permit
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                let outcome = run_isolated(probe, &endpoint, budget, grace).await;
                let _ = sender.send((index, outcome)).await;
            }));
        }
        drop(sender);

        let mut slots: Vec<Option<ProbeOutcome>> = vec![None; total];
        let mut deadline_hit = false;

        loop {
            match tokio::time::timeout_at(run_deadline, receiver.recv()).await {
                Ok(Some((index, outcome))) => {
                    self.logger.log_probe_outcome(&correlation_id, &outcome).await;
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(outcome);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    break;
                }
            }
        }

        if deadline_hit {
            for handle in &handles {
                handle.abort();
            }
            // Outcomes sent just before the deadline are still usable
            while let Ok((index, outcome)) = receiver.try_recv() {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(outcome);
                }
            }
        }

        let mut outcomes = Vec::with_capacity(total);
        for (entry, slot) in catalog.entries().iter().zip(slots) {
            let outcome = match slot {
                Some(outcome) => outcome,
                None => {
                    let name = entry.name();
                    let outcome = if deadline_hit {
                        ProbeOutcome::timed_out(
                            &name,
                            format!(
                                "{} did not finish before the overall diagnostic deadline of {}",
                                name,
                                format_duration(self.deadline)
                            ),
                        )
                    } else {
                        ProbeOutcome::failed(&name, format!("{} ended without reporting an outcome", name))
                    };
                    self.logger.log_probe_fault(&correlation_id, &name, &outcome.detail).await;
                    outcome
                }
            };
            outcomes.push(outcome);
        }

        let report = Report::new(endpoint.url(), outcomes, started_at, started.elapsed());
        self.logger.log_run_completed(&correlation_id, &report).await;
        report
    }
}

/// Run one probe inside its fault boundary
async fn run_isolated(probe: Arc<dyn Probe>, endpoint: &Endpoint, budget: Duration, grace: Duration) -> ProbeOutcome {
    let name = probe.name();
    let started = Instant::now();
    let guarded = AssertUnwindSafe(probe.run(endpoint, budget)).catch_unwind();

    match tokio::time::timeout(budget.saturating_add(grace), guarded).await {
        Ok(Ok(mut outcome)) => {
            // The catalog owns the name
            outcome.name = name;
            outcome.with_elapsed(started.elapsed())
        }
        Ok(Err(panic)) => ProbeOutcome::failed(&name, format!("{} crashed: {}", name, panic_message(panic.as_ref())))
            .with_elapsed(started.elapsed()),
        Err(_) => ProbeOutcome::timed_out(
            &name,
            format!("{} did not finish within {}", name, format_duration(budget)),
        )
        .with_elapsed(started.elapsed()),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::resolve_target, types::ProbeStatus};
    use async_trait::async_trait;

    enum Behavior {
        Pass(Duration),
        Fail(Duration),
        Panic,
        Hang,
    }

    struct StubProbe {
        name: String,
        behavior: Behavior,
    }

    impl StubProbe {
        fn boxed(name: &str, behavior: Behavior) -> Arc<dyn Probe> {
            Arc::new(Self {
                name: name.to_string(),
                behavior,
            })
        }
    }

    #[async_trait]
    impl Probe for StubProbe {
        fn name(&self) -> String {
            self.name.clone()
        }

        async fn run(&self, _endpoint: &Endpoint, _timeout: Duration) -> ProbeOutcome {
            match &self.behavior {
                Behavior::Pass(delay) => {
                    tokio::time::sleep(*delay).await;
                    ProbeOutcome::passed(&self.name, "ok")
                }
                Behavior::Fail(delay) => {
                    tokio::time::sleep(*delay).await;
                    ProbeOutcome::failed(&self.name, "refused")
                }
                Behavior::Panic => panic!("probe exploded"),
                Behavior::Hang => {
                    futures::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    fn catalog(entries: Vec<(Arc<dyn Probe>, Duration)>) -> ProbeCatalog {
        let mut catalog = ProbeCatalog::new();
        for (probe, timeout) in entries {
            catalog.push(probe, timeout).unwrap();
        }
        catalog
    }

    fn endpoint() -> Endpoint {
        resolve_target("https://example.com").unwrap()
    }

    #[tokio::test]
    async fn test_outcomes_follow_catalog_order() {
        let budget = Duration::from_secs(2);
        let catalog = catalog(vec![
            (StubProbe::boxed("slow", Behavior::Pass(Duration::from_millis(120))), budget),
            (StubProbe::boxed("medium", Behavior::Fail(Duration::from_millis(60))), budget),
            (StubProbe::boxed("fast", Behavior::Pass(Duration::ZERO)), budget),
        ]);

        let report = DiagnosticOrchestrator::new(4, Duration::from_secs(10)).diagnose(&endpoint(), &catalog).await;
        assert_eq!(report.names(), vec!["slow", "medium", "fast"]);
        assert!(report.outcomes[0].success);
        assert!(!report.outcomes[1].success);
        assert!(report.outcomes[2].success);
        assert_eq!(report.target, "https://example.com");
    }

    #[tokio::test]
    async fn test_panicking_probe_is_isolated() {
        let budget = Duration::from_secs(1);
        let catalog = catalog(vec![
            (StubProbe::boxed("before", Behavior::Pass(Duration::ZERO)), budget),
            (StubProbe::boxed("boom", Behavior::Panic), budget),
            (StubProbe::boxed("after", Behavior::Pass(Duration::from_millis(10))), budget),
        ]);

        let report = DiagnosticOrchestrator::new(4, Duration::from_secs(10)).diagnose(&endpoint(), &catalog).await;
        assert_eq!(report.len(), 3);
        let boom = report.get("boom").unwrap();
        assert_eq!(boom.status, ProbeStatus::Failed);
        assert!(boom.detail.contains("probe exploded"));
        assert!(report.get("before").unwrap().success);
        assert!(report.get("after").unwrap().success);
    }

    #[tokio::test]
    async fn test_hung_probe_times_out_without_blocking_siblings() {
        let catalog = catalog(vec![
            (StubProbe::boxed("stuck", Behavior::Hang), Duration::from_millis(200)),
            (StubProbe::boxed("quick", Behavior::Pass(Duration::ZERO)), Duration::from_secs(1)),
        ]);

        let started = std::time::Instant::now();
        let report = DiagnosticOrchestrator::new(4, Duration::from_secs(10))
            .with_grace(Duration::from_millis(50))
            .diagnose(&endpoint(), &catalog)
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        let stuck = report.get("stuck").unwrap();
        assert_eq!(stuck.status, ProbeStatus::TimedOut);
        assert!(stuck.detail.contains("200ms"));
        assert!(report.get("quick").unwrap().success);
    }

    #[tokio::test]
    async fn test_overall_deadline_fills_remaining_slots() {
        let catalog = catalog(vec![
            (StubProbe::boxed("quick", Behavior::Pass(Duration::ZERO)), Duration::from_secs(30)),
            (StubProbe::boxed("stuck", Behavior::Hang), Duration::from_secs(30)),
        ]);

        let started = std::time::Instant::now();
        let report = DiagnosticOrchestrator::new(4, Duration::from_millis(300))
            .diagnose(&endpoint(), &catalog)
            .await;

        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(report.len(), 2);
        assert!(report.get("quick").unwrap().success);
        let stuck = report.get("stuck").unwrap();
        assert_eq!(stuck.status, ProbeStatus::TimedOut);
        assert!(stuck.detail.contains("overall diagnostic deadline"));
    }

    #[tokio::test]
    async fn test_timeout_starts_after_permit() {
        // With one permit the second probe waits ~150ms; its own 250ms budget
        // must not be spent waiting
        let budget = Duration::from_millis(250);
        let catalog = catalog(vec![
            (StubProbe::boxed("first", Behavior::Pass(Duration::from_millis(150))), budget),
            (StubProbe::boxed("second", Behavior::Pass(Duration::from_millis(150))), budget),
        ]);

        let report = DiagnosticOrchestrator::new(1, Duration::from_secs(10))
            .with_grace(Duration::ZERO)
            .diagnose(&endpoint(), &catalog)
            .await;
        assert!(report.all_passed(), "{:?}", report.outcomes);
    }

    #[tokio::test]
    async fn test_catalog_name_overrides_probe_name() {
        struct Misnamed;

        #[async_trait]
        impl Probe for Misnamed {
            fn name(&self) -> String {
                "Catalog Name".to_string()
            }

            async fn run(&self, _endpoint: &Endpoint, _timeout: Duration) -> ProbeOutcome {
                ProbeOutcome::passed("something else", "ok")
            }
        }

        let catalog = catalog(vec![(Arc::new(Misnamed) as Arc<dyn Probe>, Duration::from_secs(1))]);
        let report = DiagnosticOrchestrator::new(2, Duration::from_secs(5)).diagnose(&endpoint(), &catalog).await;
        assert_eq!(report.names(), vec!["Catalog Name"]);
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_empty_report() {
        let report = DiagnosticOrchestrator::new(2, Duration::from_secs(1))
            .diagnose(&endpoint(), &ProbeCatalog::new())
            .await;
        assert!(report.is_empty());
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn test_unrepresentable_deadline_does_not_overflow() {
        let catalog = catalog(vec![(StubProbe::boxed("quick", Behavior::Pass(Duration::ZERO)), Duration::from_secs(1))]);

        let report = DiagnosticOrchestrator::new(2, Duration::from_secs(u64::MAX))
            .diagnose(&endpoint(), &catalog)
            .await;
        assert_eq!(report.len(), 1);
        assert!(report.get("quick").unwrap().success);
    }

    #[tokio::test]
    async fn test_unbounded_entry_budget_does_not_overflow() {
        let catalog = catalog(vec![(StubProbe::boxed("quick", Behavior::Pass(Duration::ZERO)), Duration::MAX)]);

        let report = DiagnosticOrchestrator::new(2, Duration::from_secs(5)).diagnose(&endpoint(), &catalog).await;
        assert!(report.all_passed());
    }

    #[test]
    fn test_concurrency_floor() {
        assert_eq!(DiagnosticOrchestrator::new(0, Duration::from_secs(1)).max_concurrency(), 1);
    }
}
