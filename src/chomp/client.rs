//! Outbound client for the Chomp REST API.

use crate::chomp::api::ChompResponse;
use crate::chomp::error::UpstreamError;
use crate::config::UpstreamConfig;

const BARCODE_PATH: &str = "/food/branded/barcode.php";
const NAME_PATH: &str = "/food/branded/name.php";

/// Performs exactly one GET per call. No retries, no timeout of its own.
#[derive(Debug, Clone)]
pub struct ChompClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChompClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    pub fn with_http_client(http: reqwest::Client, config: UpstreamConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up branded foods by barcode.
    pub async fn food_by_barcode(
        &self,
        api_key: &str,
        code: &str,
    ) -> Result<ChompResponse, UpstreamError> {
        self.get(BARCODE_PATH, api_key, ("code", code)).await
    }

    /// Search branded foods by name.
    pub async fn foods_by_name(
        &self,
        api_key: &str,
        name: &str,
    ) -> Result<ChompResponse, UpstreamError> {
        self.get(NAME_PATH, api_key, ("name", name)).await
    }

    async fn get(
        &self,
        path: &str,
        api_key: &str,
        lookup: (&str, &str),
    ) -> Result<ChompResponse, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);

        // reqwest percent-encodes both values.
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", api_key), lookup])
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        // Non-2xx bodies are decoded like any other; an error document has
        // no items and surfaces as NotFound.
        tracing::debug!(url = %url, status = %response.status(), "Chomp API responded");

        let body = response.bytes().await.map_err(UpstreamError::Read)?;
        // A bare `null` document carries no items.
        serde_json::from_slice::<Option<ChompResponse>>(&body)
            .map(Option::unwrap_or_default)
            .map_err(UpstreamError::Decode)
    }
}
