//! Connectivity probes
//!
//! Every probe implements [`Probe`]: one bounded check against an
//! [`Endpoint`] that always yields a [`ProbeOutcome`]. Probes hold only
//! read-only shared handles (resolver, HTTP client, ISP lookup) and keep no
//! state between runs.

pub mod catalog;
pub mod dns;
pub mod http;
pub mod isp;
pub mod port;
pub mod throughput;
pub mod tls;
pub mod tunnel;
pub mod websocket;

pub use catalog::{CatalogEntry, ProbeCatalog};
pub use dns::DnsProbe;
pub use http::HttpProbe;
pub use isp::IspProbe;
pub use port::PortProbe;
pub use throughput::ThroughputProbe;
pub use tls::SniProbe;
pub use tunnel::TunnelProbe;
pub use websocket::WebSocketProbe;

use crate::{
    dns::DnsManager,
    error::{AppError, Result},
    isp::{IpInfoClient, IspLookup},
    models::{Config, Endpoint, ProbeOutcome},
    types::format_duration,
};
use async_trait::async_trait;
use reqwest::Client;
use std::{future::Future, sync::Arc, time::Duration};

/// A single self-contained connectivity check
#[async_trait]
pub trait Probe: Send + Sync {
    /// Name used for the outcome; unique within a catalog
    fn name(&self) -> String;

    /// Run the check within `timeout`. Errors become non-success outcomes.
    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome;
}

/// Shared, read-only handles injected into the probes
#[derive(Clone)]
pub struct ProbeContext {
    pub dns: Arc<DnsManager>,
    pub http: Client,
    pub isp: Arc<dyn IspLookup>,
}

impl ProbeContext {
    pub fn new(dns: Arc<DnsManager>, http: Client, isp: Arc<dyn IspLookup>) -> Self {
        Self { dns, http, isp }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            dns: Arc::new(DnsManager::from_config(config)?),
            http: build_http_client()?,
            isp: Arc::new(IpInfoClient::from_config(config)?),
        })
    }
}

/// HTTP client shared by the HTTP and throughput probes; timeouts are set per request
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .no_proxy()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))
}

/// Await `future` for at most `budget`; expiry becomes a timeout error naming `what`
pub(crate) async fn within<T, F>(budget: Duration, what: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, future).await {
        Ok(result) => result,
        Err(_) => Err(AppError::timeout(format!("{} timed out after {}", what, format_duration(budget)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_within_passes_result_through() {
        let value = within(Duration::from_secs(1), "noop", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);

        let error = within::<(), _>(Duration::from_secs(1), "noop", async { Err(AppError::network("refused")) })
            .await
            .unwrap_err();
        assert_eq!(error.category(), "NETWORK");
    }

    #[tokio::test]
    async fn test_within_times_out() {
        let error = within(Duration::from_millis(20), "Slow lookup", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(error.is_timeout());
        assert_eq!(error.message(), "Slow lookup timed out after 20ms");
    }
}
