use super::Probe;
use crate::{
    error::{AppError, Result},
    models::{Endpoint, ProbeOutcome},
    types::{format_duration, Scheme},
};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio_tungstenite::connect_async;

/// Why one upgrade attempt did not succeed
enum StageFailure {
    TimedOut(Duration),
    Error(String),
}

impl StageFailure {
    fn describe(&self) -> String {
        match self {
            Self::TimedOut(budget) => format!("timed out after {}", format_duration(*budget)),
            Self::Error(message) => message.clone(),
        }
    }
}

/// WebSocket upgrade over `ws://`, then `wss://` if the first attempt fails
pub struct WebSocketProbe;

impl WebSocketProbe {
    pub fn new() -> Self {
        Self
    }

    async fn attempt(url: &str, budget: Duration) -> std::result::Result<(), StageFailure> {
        if budget.is_zero() {
            return Err(StageFailure::TimedOut(budget));
        }

        match tokio::time::timeout(budget, connect_async(url)).await {
            Ok(Ok((mut stream, _response))) => {
                let _ = stream.close(None).await;
                Ok(())
            }
            Ok(Err(e)) => Err(StageFailure::Error(e.to_string())),
            Err(_) => Err(StageFailure::TimedOut(budget)),
        }
    }

    async fn check(&self, endpoint: &Endpoint, timeout: Duration) -> Result<String> {
        let started = Instant::now();
        let plain_url = format!("{}/", endpoint.url_with_scheme(Scheme::Http.websocket_scheme()));
        let secure_url = format!("{}/", endpoint.url_with_scheme(Scheme::Https.websocket_scheme()));

        let first = match Self::attempt(&plain_url, timeout / 2).await {
            Ok(()) => return Ok(format!("WebSocket upgrade succeeded at {}", plain_url)),
            Err(failure) => failure,
        };

        let remaining = timeout.saturating_sub(started.elapsed());
        let second = match Self::attempt(&secure_url, remaining).await {
            Ok(()) => return Ok(format!("WebSocket upgrade succeeded at {}", secure_url)),
            Err(failure) => failure,
        };

        let detail = format!(
            "{} failed: {}; {} failed: {}",
            plain_url,
            first.describe(),
            secure_url,
            second.describe()
        );

        match (&first, &second) {
            (StageFailure::TimedOut(_), StageFailure::TimedOut(_)) => Err(AppError::timeout(detail)),
            _ => Err(AppError::websocket(detail)),
        }
    }
}

impl Default for WebSocketProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for WebSocketProbe {
    fn name(&self) -> String {
        "WebSocket Check".to_string()
    }

    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        ProbeOutcome::from_result(self.name(), self.check(endpoint, timeout).await)
    }
}
