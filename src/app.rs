//! Inbound interface: raw address in, report out

use crate::{
    error::Result,
    executor::DiagnosticOrchestrator,
    logging::DiagnosticLogger,
    models::{resolve_target, Config, Report},
    probes::{ProbeCatalog, ProbeContext},
};

/// Connection checker facade
///
/// Holds the probe catalog and orchestrator built from one configuration.
/// Each call to [`check`](Self::check) is an independent diagnostic run.
pub struct ConnectionChecker {
    config: Config,
    catalog: ProbeCatalog,
    orchestrator: DiagnosticOrchestrator,
    logger: DiagnosticLogger,
}

impl ConnectionChecker {
    /// Validate `config` and build the standard probe catalog from it
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let ctx = ProbeContext::from_config(&config)?;
        let catalog = ProbeCatalog::standard(&ctx, &config)?;
        Ok(Self::with_catalog(config, catalog))
    }

    /// Checker running a caller-supplied catalog
    pub fn with_catalog(config: Config, catalog: ProbeCatalog) -> Self {
        let logger = DiagnosticLogger::new(&config);
        let orchestrator = DiagnosticOrchestrator::from_config(&config).with_logger(logger.clone());
        Self {
            config,
            catalog,
            orchestrator,
            logger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &ProbeCatalog {
        &self.catalog
    }

    /// Diagnose `raw`; only an unparseable address prevents a report
    pub async fn check(&self, raw: &str) -> Result<Report> {
        let endpoint = match resolve_target(raw) {
            Ok(endpoint) => endpoint,
            Err(error) => {
                self.logger.log_error(&error, "Resolving target").await;
                return Err(error);
            }
        };

        Ok(self.orchestrator.diagnose(&endpoint, &self.catalog).await)
    }
}
