use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{Endpoint, GatewayError, GatewayRequest, GatewayResponse, TelecomGateway};

/// [`TelecomGateway`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGateway {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Build a client with a request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client, base_url))
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }
}

#[async_trait]
impl TelecomGateway for HttpGateway {
    async fn call(
        &self,
        endpoint: Endpoint,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        tracing::debug!(
            endpoint = endpoint.path(),
            action = request.action.as_str(),
            service = %request.service,
            transid = %request.transid,
            "calling provider gateway"
        );

        let mut req = self.client.post(self.url(endpoint)).json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), transid = %request.transid, "gateway error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<GatewayResponse>(&body).map_err(|err| {
            tracing::warn!(transid = %request.transid, "undecodable gateway body: {err}");
            GatewayError::Decode(err.to_string())
        })
    }
}
