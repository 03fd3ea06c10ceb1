use std::time::Duration;

use log::warn;
use reqwest::Client;

const MANIFEST_URL: &str = "https://philoop.net/mc/pack_version.txt";

/// HTTP transport for the pack manifest endpoint.
///
/// One fetch, full body, no retries; callers decide what a failure means.
#[derive(Clone)]
pub struct ManifestClient {
    client: Client,
    url: String,
}

impl ManifestClient {
    pub fn new() -> Self {
        Self::with_url(MANIFEST_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|err| {
                warn!("manifest client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw manifest document.
    pub async fn fetch_bytes(&self) -> Result<Vec<u8>, String> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| format!("manifest request failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("manifest status error: {e}"))?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| format!("manifest body error: {e}"))?;
        Ok(bytes.to_vec())
    }
}

impl Default for ManifestClient {
    fn default() -> Self {
        Self::new()
    }
}
