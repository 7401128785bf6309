//! Supabase REST (PostgREST) and Storage clients.
//!
//! Both clients talk to the same project and authenticate the same way: the
//! service key is sent as the `apikey` header and as a bearer token.

pub mod rest;
pub mod storage;

pub use rest::SupabaseClient;
pub use storage::{PRODUCTS_BUCKET, StorageClient};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response. `message` is the upstream message.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Error body shared by PostgREST and Storage.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Build an HTTP client that sends the project credentials on every request.
fn build_http_client(config: &SupabaseConfig) -> Result<reqwest::Client, SupabaseError> {
    let key = config.service_key.expose_secret();

    let mut apikey = HeaderValue::from_str(key)
        .map_err(|e| SupabaseError::Config(format!("Invalid service key format: {e}")))?;
    apikey.set_sensitive(true);

    let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|e| SupabaseError::Config(format!("Invalid service key format: {e}")))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", apikey);
    headers.insert(AUTHORIZATION, bearer);

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .build()?)
}

/// Resolve a service root such as `rest/v1/` against the project URL.
fn service_url(project: &Url, service: &str) -> Result<Url, SupabaseError> {
    let mut base = project.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(service)
        .map_err(|e| SupabaseError::Config(format!("Invalid project URL: {e}")))
}

/// Turn a non-success response into [`SupabaseError::Api`].
async fn api_error(response: reqwest::Response) -> SupabaseError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .unwrap_or(text);
    SupabaseError::Api { status, message }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_url_without_trailing_slash() {
        let project = Url::parse("https://abcd.supabase.co").unwrap();
        assert_eq!(
            service_url(&project, "rest/v1/").unwrap().as_str(),
            "https://abcd.supabase.co/rest/v1/"
        );
    }

    #[test]
    fn test_service_url_keeps_path_prefix() {
        let project = Url::parse("http://localhost:54321/proxy").unwrap();
        assert_eq!(
            service_url(&project, "storage/v1/").unwrap().as_str(),
            "http://localhost:54321/proxy/storage/v1/"
        );
    }
}
