use super::{within, Probe};
use crate::{
    dns::DnsManager,
    error::{AppError, Result},
    models::{Endpoint, ProbeOutcome},
    types::Scheme,
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpStream;
use tokio_rustls::{
    rustls::{self, ProtocolVersion},
    TlsConnector,
};

/// TLS handshake with the target host as SNI, validated against the webpki roots
///
/// The handshake goes to port 443 unless the address names an explicit port.
pub struct SniProbe {
    dns: Arc<DnsManager>,
    connector: TlsConnector,
}

impl SniProbe {
    pub fn new(dns: Arc<DnsManager>) -> Self {
        Self::with_config(dns, Arc::new(default_client_config()))
    }

    /// Probe using a caller-supplied rustls configuration
    pub fn with_config(dns: Arc<DnsManager>, config: Arc<rustls::ClientConfig>) -> Self {
        Self {
            dns,
            connector: TlsConnector::from(config),
        }
    }

    async fn check(&self, endpoint: &Endpoint) -> Result<String> {
        let host = endpoint.host();
        let server_name = rustls::ServerName::try_from(host)
            .map_err(|e| AppError::tls(format!("{} is not a valid TLS server name: {}", host, e)))?;

        let ip = self.dns.resolve_one(host).await?;
        let tcp = TcpStream::connect((ip, endpoint.port()))
            .await
            .map_err(|e| AppError::network(format!("TCP connect to {}:{} failed: {}", host, endpoint.port(), e)))?;

        let tls = self
            .connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| AppError::tls(format!("TLS handshake with {} failed: {}", host, e)))?;

        let (_, session) = tls.get_ref();
        let version = session
            .protocol_version()
            .map(version_label)
            .unwrap_or_else(|| "unknown TLS version".to_string());

        Ok(format!("TLS handshake with SNI {} succeeded using {}", host, version))
    }
}

fn default_client_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
        rustls::OwnedTrustAnchor::from_subject_spki_name_constraints(ta.subject, ta.spki, ta.name_constraints)
    }));

    rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

fn version_label(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_3 => "TLS 1.3".to_string(),
        ProtocolVersion::TLSv1_2 => "TLS 1.2".to_string(),
        other => format!("{:?}", other),
    }
}

#[async_trait]
impl Probe for SniProbe {
    fn name(&self) -> String {
        "SNI Check".to_string()
    }

    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        if endpoint.scheme() == Scheme::Http {
            return ProbeOutcome::not_applicable(self.name(), "SNI is only applicable for HTTPS connections");
        }

        let what = format!("TLS handshake with {}", endpoint.authority());
        ProbeOutcome::from_result(self.name(), within(timeout, &what, self.check(endpoint)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::resolve_target, types::ProbeStatus};
    use tokio::net::TcpListener;

    fn probe() -> SniProbe {
        let dns = DnsManager::with_servers(&["127.0.0.1".parse().unwrap()], Duration::from_millis(300)).unwrap();
        SniProbe::new(Arc::new(dns))
    }

    #[tokio::test]
    async fn test_http_scheme_is_not_applicable() {
        let endpoint = resolve_target("http://example.com").unwrap();
        let outcome = probe().run(&endpoint, Duration::from_secs(1)).await;
        assert_eq!(outcome.name, "SNI Check");
        assert_eq!(outcome.status, ProbeStatus::NotApplicable);
        assert!(!outcome.success);
        assert_eq!(outcome.detail, "SNI is only applicable for HTTPS connections");
    }

    #[tokio::test]
    async fn test_non_tls_server_fails_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            if let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n").await;
            }
        });

        let endpoint = resolve_target(&format!("https://127.0.0.1:{}", port)).unwrap();
        let outcome = probe().run(&endpoint, Duration::from_secs(2)).await;
        assert_eq!(outcome.status, ProbeStatus::Failed);
        assert!(outcome.detail.contains("TLS handshake"));
    }

    #[tokio::test]
    async fn test_closed_explicit_port_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = resolve_target(&format!("https://127.0.0.1:{}", port)).unwrap();
        let outcome = probe().run(&endpoint, Duration::from_secs(2)).await;
        assert!(!outcome.success);
        assert!(outcome.detail.contains("TCP connect"));
        assert!(outcome.detail.contains(&format!("127.0.0.1:{}", port)), "{}", outcome.detail);
    }

    #[test]
    fn test_version_labels() {
        assert_eq!(version_label(ProtocolVersion::TLSv1_3), "TLS 1.3");
        assert_eq!(version_label(ProtocolVersion::TLSv1_2), "TLS 1.2");
    }
}
