use super::{within, Probe};
use crate::{
    dns::DnsManager,
    error::Result,
    isp::IspLookup,
    models::{Endpoint, ProbeOutcome},
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

/// Resolves the host and asks the lookup service who operates the address
pub struct IspProbe {
    dns: Arc<DnsManager>,
    lookup: Arc<dyn IspLookup>,
}

impl IspProbe {
    pub fn new(dns: Arc<DnsManager>, lookup: Arc<dyn IspLookup>) -> Self {
        Self { dns, lookup }
    }

    async fn check(&self, endpoint: &Endpoint) -> Result<String> {
        let ip = self.dns.resolve_one(endpoint.host()).await?;
        let details = self.lookup.lookup(ip).await?;
        Ok(format!(
            "ISP: {} (Location: {}, {})",
            details.organization, details.city, details.country
        ))
    }
}

#[async_trait]
impl Probe for IspProbe {
    fn name(&self) -> String {
        "ISP Check".to_string()
    }

    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        let what = format!("ISP lookup for {}", endpoint.host());
        ProbeOutcome::from_result(self.name(), within(timeout, &what, self.check(endpoint)).await)
    }
}
