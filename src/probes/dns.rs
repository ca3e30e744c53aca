use super::{within, Probe};
use crate::{
    dns::DnsManager,
    error::Result,
    models::{Endpoint, ProbeOutcome},
};
use async_trait::async_trait;
use std::{net::IpAddr, sync::Arc, time::Duration};

/// Resolves the target host through the configured resolver
pub struct DnsProbe {
    dns: Arc<DnsManager>,
}

impl DnsProbe {
    pub fn new(dns: Arc<DnsManager>) -> Self {
        Self { dns }
    }

    async fn check(&self, endpoint: &Endpoint, timeout: Duration) -> Result<String> {
        if let Some(ip) = endpoint.ip_literal() {
            return Ok(format!("{} is an IP address; no lookup needed", ip));
        }

        let ips = within(
            timeout,
            &format!("DNS lookup for {}", endpoint.host()),
            self.dns.resolve(endpoint.host()),
        )
        .await?;

        Ok(format!(
            "Resolved {} to {} via {}",
            endpoint.host(),
            join_addresses(&ips),
            self.dns.source().name()
        ))
    }
}

fn join_addresses(ips: &[IpAddr]) -> String {
    ips.iter().map(IpAddr::to_string).collect::<Vec<_>>().join(", ")
}

#[async_trait]
impl Probe for DnsProbe {
    fn name(&self) -> String {
        "DNS Resolution".to_string()
    }

    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        ProbeOutcome::from_result(self.name(), self.check(endpoint, timeout).await)
    }
}
