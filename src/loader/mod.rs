use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::model::Company;

/// User-facing line shown in place of the card area when the dataset cannot
/// be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Erro ao carregar fornecedores.";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid dataset: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read '{path}': {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

pub fn build_client(timeout: usize, proxy: &str) -> Result<reqwest::Client, String> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static("selodir/0.1"),
    );
    let builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(timeout.try_into().unwrap_or(10)));
    let builder = if proxy.is_empty() {
        builder
    } else {
        let proxy = reqwest::Proxy::all(proxy.to_string())
            .map_err(|e| format!("Could not setup proxy, err: {e}"))?;
        builder.proxy(proxy)
    };
    builder
        .build()
        .map_err(|e| format!("failed to build http client: {e}"))
}

/// One GET of the dataset URL; the body must be a JSON array of companies.
/// No retry on failure.
pub async fn fetch_companies(
    client: &reqwest::Client,
    url: &Url,
) -> Result<Vec<Company>, LoadError> {
    let response = client.get(url.clone()).send().await?;
    if !response.status().is_success() {
        return Err(LoadError::Status(response.status()));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Local-file variant of the loader, sharing the decode path.
pub async fn read_companies(path: &str) -> Result<Vec<Company>, LoadError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::File {
            path: path.to_string(),
            source: e,
        })?;
    Ok(serde_json::from_str(&contents)?)
}
