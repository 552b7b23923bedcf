//! Remote backend discovery.
//!
//! Asks an OpenAI-compatible server for its `/v1/models` listing so the CLI
//! can tell the user, before the first turn, whether remote replies will work
//! or every turn will fall back to the mock generator.

use serde::Deserialize;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// A single entry of the `/v1/models` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteModel {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<RemoteModel>,
}

pub(crate) fn models_url(base_url: &str) -> String {
    format!("{}/v1/models", base_url.trim_end_matches('/'))
}

/// Return the models the server advertises, or a human-readable reason why
/// it could not be reached.
pub fn fetch_models(base_url: &str, api_key: &str) -> Result<Vec<RemoteModel>, String> {
    let url = models_url(base_url);
    let client = reqwest::blocking::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let mut request = client.get(&url);
    if !api_key.is_empty() {
        request = request.bearer_auth(api_key);
    }
    let response = request
        .send()
        .map_err(|e| format!("Model server unreachable at {}: {}", url, e))?;

    if !response.status().is_success() {
        return Err(format!("Model server returned HTTP {}", response.status()));
    }

    let listing: ModelsResponse = response
        .json()
        .map_err(|e| format!("Failed to parse model listing: {}", e))?;

    Ok(listing.data)
}
