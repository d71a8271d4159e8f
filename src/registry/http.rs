//! HTTP client for the public taxpayer (RUC) registry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::{Error, RegistryClient, TaxpayerProfile};

pub const DEFAULT_BASE_URL: &str = "https://api.apis.net.pe/v2/ruc/";

#[derive(Clone)]
pub struct HttpRegistryClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Subset of the registry's response we keep.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RucResponse {
    razon_social: Option<String>,
    estado: Option<String>,
    condicion: Option<String>,
}

impl HttpRegistryClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build registry HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn fetch(&self, ruc: &str) -> Result<TaxpayerProfile, Error> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::Internal("Registry API token not configured on the server".to_string()))?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("numero", ruc)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(ruc, error = %e, "Registry request failed");
                Error::Upstream("Could not connect to the RUC consultation service".to_string())
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("RUC {} not found", ruc)));
        }
        if !status.is_success() {
            tracing::error!(ruc, status = %status, "Registry returned an error status");
            return Err(Error::Upstream(format!(
                "RUC consultation service answered {}",
                status
            )));
        }

        let body: RucResponse = response.json().await.map_err(|e| {
            tracing::error!(ruc, error = %e, "Registry response could not be decoded");
            Error::Upstream("RUC consultation service returned an unreadable response".to_string())
        })?;

        match body.razon_social.filter(|name| !name.trim().is_empty()) {
            Some(razon_social) => Ok(TaxpayerProfile {
                ruc: ruc.to_string(),
                razon_social,
                estado: body.estado,
                condicion: body.condicion,
            }),
            None => Err(Error::NotFound(format!("RUC {} not found", ruc))),
        }
    }
}
