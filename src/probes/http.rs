use super::{within, Probe};
use crate::{
    error::{AppError, Result},
    models::{Endpoint, ProbeOutcome},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Plain GET of the target root; passes only on HTTP 200
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn check(&self, endpoint: &Endpoint, timeout: Duration) -> Result<String> {
        let url = endpoint.url();
        let response = within(timeout, &format!("GET {}", url), async {
            self.client
                .get(&url)
                .timeout(timeout)
                .send()
                .await
                .map_err(AppError::from)
        })
        .await?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(format!("Response code: {}", status.as_u16()))
        } else {
            Err(AppError::http_request(format!("Response code: {}", status.as_u16())))
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn name(&self) -> String {
        "HTTP Connection".to_string()
    }

    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        ProbeOutcome::from_result(self.name(), self.check(endpoint, timeout).await)
    }
}
