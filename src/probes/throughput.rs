use super::Probe;
use crate::{
    error::{AppError, Result},
    models::{Endpoint, ProbeOutcome},
    types::format_duration,
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;

/// Single bounded download of the target root, reported as an estimate
///
/// The figure includes DNS, connection and TLS setup and comes from one
/// small transfer, so it is always labelled an approximation.
pub struct ThroughputProbe {
    client: Client,
    max_bytes: u64,
}

impl ThroughputProbe {
    pub fn new(client: Client, max_bytes: u64) -> Self {
        Self { client, max_bytes }
    }

    async fn check(&self, endpoint: &Endpoint, timeout: Duration) -> Result<String> {
        let url = endpoint.url();
        let started = Instant::now();
        let deadline = started + timeout;

        let response = match tokio::time::timeout_at(deadline, self.client.get(&url).send()).await {
            Ok(result) => result.map_err(|e| {
                let error = AppError::from(e);
                error.with_message(format!("Approximation unavailable: GET {} failed: {}", url, error.message()))
            })?,
            Err(_) => {
                return Err(AppError::timeout(format!(
                    "Approximation unavailable: no response from {} within {}",
                    url,
                    format_duration(timeout)
                )))
            }
        };

        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;
        let mut cut_off = false;

        while received < self.max_bytes {
            match tokio::time::timeout_at(deadline, stream.next()).await {
                Ok(Some(Ok(chunk))) => received += chunk.len() as u64,
                Ok(Some(Err(e))) => {
                    if received == 0 {
                        return Err(AppError::network(format!(
                            "Approximation unavailable: transfer from {} failed: {}",
                            url, e
                        )));
                    }
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    cut_off = true;
                    break;
                }
            }
        }

        let elapsed = started.elapsed();
        if received == 0 {
            return Err(AppError::network(format!(
                "Approximation unavailable: {} returned no payload to measure",
                url
            )));
        }

        let received = received.min(self.max_bytes);
        let mut detail = format!(
            "Approximation: {:.2} Mbps ({} bytes in {} from {}; includes connection setup)",
            megabits_per_second(received, elapsed),
            received,
            format_duration(elapsed),
            url
        );
        if cut_off {
            detail.push_str("; transfer cut off at the time budget");
        }
        Ok(detail)
    }
}

fn megabits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64().max(0.001);
    (bytes as f64 * 8.0) / seconds / 1_000_000.0
}

#[async_trait]
impl Probe for ThroughputProbe {
    fn name(&self) -> String {
        "Throughput Estimate".to_string()
    }

    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        ProbeOutcome::from_result(self.name(), self.check(endpoint, timeout).await).approximate()
    }
}
