//! Ordered list of probes run for every diagnostic request

use super::{
    DnsProbe, HttpProbe, IspProbe, PortProbe, Probe, ProbeContext, SniProbe, ThroughputProbe, TunnelProbe,
    WebSocketProbe,
};
use crate::{
    error::{AppError, Result},
    models::Config,
};
use std::{sync::Arc, time::Duration};

/// One catalog slot: a probe and the time budget it runs under
#[derive(Clone)]
pub struct CatalogEntry {
    pub probe: Arc<dyn Probe>,
    pub timeout: Duration,
}

impl CatalogEntry {
    pub fn new(probe: Arc<dyn Probe>, timeout: Duration) -> Self {
        Self { probe, timeout }
    }

    pub fn name(&self) -> String {
        self.probe.name()
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("name", &self.probe.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Probes in report order; names are unique
#[derive(Clone, Debug, Default)]
pub struct ProbeCatalog {
    entries: Vec<CatalogEntry>,
}

impl ProbeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard battery: DNS, HTTP, SNI, WebSocket, tunnel feasibility,
    /// ISP lookup, one probe per configured port, throughput
    pub fn standard(ctx: &ProbeContext, config: &Config) -> Result<Self> {
        let probe_timeout = config.probe_timeout();
        let mut catalog = Self::new();

        catalog.push(Arc::new(DnsProbe::new(ctx.dns.clone())), probe_timeout)?;
        catalog.push(Arc::new(HttpProbe::new(ctx.http.clone())), probe_timeout)?;
        catalog.push(Arc::new(SniProbe::new(ctx.dns.clone())), probe_timeout)?;
        catalog.push(Arc::new(WebSocketProbe::new()), probe_timeout)?;
        catalog.push(Arc::new(TunnelProbe::new(ctx.dns.clone())), probe_timeout)?;
        catalog.push(Arc::new(IspProbe::new(ctx.dns.clone(), ctx.isp.clone())), probe_timeout)?;
        // Port entries cover the DNS lookup and then a full connect attempt
        let port_budget = probe_timeout + config.port_timeout();
        for &port in &config.ports {
            let probe = PortProbe::new(ctx.dns.clone(), port, config.port_timeout());
            catalog.push(Arc::new(probe), port_budget)?;
        }
        catalog.push(
            Arc::new(ThroughputProbe::new(ctx.http.clone(), config.throughput_max_bytes)),
            probe_timeout,
        )?;

        Ok(catalog)
    }

    /// Append a probe; rejects a name already in the catalog
    pub fn push(&mut self, probe: Arc<dyn Probe>, timeout: Duration) -> Result<()> {
        let name = probe.name();
        if self.entries.iter().any(|entry| entry.name() == name) {
            return Err(AppError::config(format!("Probe '{}' is already in the catalog", name)));
        }
        self.entries.push(CatalogEntry::new(probe, timeout));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(CatalogEntry::name).collect()
    }

    /// Longest single budget in the catalog
    pub fn max_timeout(&self) -> Duration {
        self.entries.iter().map(|entry| entry.timeout).max().unwrap_or_default()
    }
}
