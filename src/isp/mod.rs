//! ISP and geolocation lookup for resolved target addresses
//!
//! The default implementation talks to an ipinfo.io-compatible service
//! (`GET {base}/{ip}/json`). The access token is injected from configuration.

use crate::{
    error::{AppError, Result},
    models::Config,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, time::Duration};

/// Organization and location of an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IspDetails {
    pub organization: String,
    pub city: String,
    pub country: String,
}

/// Lookup capability used by the ISP probe
#[async_trait]
pub trait IspLookup: Send + Sync {
    /// Name of the backing service, used in failure details
    fn service_name(&self) -> &str;

    async fn lookup(&self, ip: IpAddr) -> Result<IspDetails>;
}

/// Response body of the ipinfo `/{ip}/json` endpoint
#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    org: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    bogon: Option<bool>,
}

/// ipinfo.io-compatible HTTP lookup client
pub struct IpInfoClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    service_name: String,
}

impl IpInfoClient {
    pub fn new(base_url: &str, token: Option<String>, request_timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| AppError::config(format!("Invalid ISP lookup URL '{}': {}", base_url, e)))?;
        let service_name = parsed
            .host_str()
            .map(str::to_string)
            .unwrap_or_else(|| "ISP lookup service".to_string());

        let client = Client::builder()
            .timeout(request_timeout)
            .no_proxy()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            service_name,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.isp_lookup_url, config.ipinfo_token.clone(), config.probe_timeout())
    }

    fn lookup_url(&self, ip: IpAddr) -> String {
        format!("{}/{}/json", self.base_url, ip)
    }
}

#[async_trait]
impl IspLookup for IpInfoClient {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    async fn lookup(&self, ip: IpAddr) -> Result<IspDetails> {
        let mut request = self.client.get(self.lookup_url(ip)).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::dependency_unavailable(&self.service_name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::dependency_unavailable(
                &self.service_name,
                format!("lookup for {} returned HTTP {}", ip, status.as_u16()),
            ));
        }

        let body: IpInfoResponse = response.json().await.map_err(|e| {
            AppError::dependency_unavailable(&self.service_name, format!("unreadable response: {}", e))
        })?;

        if body.bogon.unwrap_or(false) {
            return Err(AppError::network(format!(
                "{} is a private or reserved address with no ISP",
                ip
            )));
        }

        let organization = body
            .org
            .filter(|org| !org.trim().is_empty())
            .ok_or_else(|| AppError::network(format!("{} returned no organization for {}", self.service_name, ip)))?;

        Ok(IspDetails {
            organization,
            city: body.city.unwrap_or_else(|| "unknown city".to_string()),
            country: body.country.unwrap_or_else(|| "unknown country".to_string()),
        })
    }
}
