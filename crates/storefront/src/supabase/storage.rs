//! Supabase Storage client for product photos.

use serde::Serialize;
use tracing::instrument;
use url::Url;

use super::{SupabaseError, api_error, build_http_client, service_url};
use crate::config::SupabaseConfig;

/// Bucket holding product photos.
pub const PRODUCTS_BUCKET: &str = "products";

/// Maximum object size accepted by the products bucket.
pub const BUCKET_FILE_SIZE_LIMIT: u64 = 10 * 1024 * 1024;

/// Body of a bucket creation request.
#[derive(Debug, Serialize)]
struct CreateBucket<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    file_size_limit: u64,
    allowed_mime_types: &'a [&'a str],
}

/// Object storage client over the Supabase Storage API.
#[derive(Clone)]
pub struct StorageClient {
    client: reqwest::Client,
    storage_url: Url,
}

impl StorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value, the project URL
    /// cannot be extended, or the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        Ok(Self {
            client: build_http_client(config)?,
            storage_url: service_url(&config.url, "storage/v1/")?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        self.storage_url
            .join(path)
            .map_err(|e| SupabaseError::Config(format!("Invalid storage URL: {e}")))
    }

    /// Create a public image bucket unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns error if creation fails for any reason other than the bucket
    /// already existing.
    #[instrument(skip(self))]
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<(), SupabaseError> {
        let body = CreateBucket {
            id: bucket,
            name: bucket,
            public: true,
            file_size_limit: BUCKET_FILE_SIZE_LIMIT,
            allowed_mime_types: &["image/*"],
        };

        let response = self
            .client
            .post(self.endpoint("bucket")?)
            .json(&body)
            .send()
            .await?;
        if response.status().is_success() {
            tracing::info!(bucket, "Created storage bucket");
            return Ok(());
        }

        match api_error(response).await {
            SupabaseError::Api { message, .. } if message.to_lowercase().contains("already") => {
                Ok(())
            }
            err => Err(err),
        }
    }

    /// Upload an object without overwriting an existing one.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the object already exists.
    #[instrument(skip(self, body))]
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        body: impl Into<reqwest::Body>,
    ) -> Result<(), SupabaseError> {
        let url = self.endpoint(&format!("object/{bucket}/{path}"))?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Public URL of an object in a public bucket.
    ///
    /// # Errors
    ///
    /// Returns error if the path does not form a valid URL.
    pub fn public_url(&self, bucket: &str, path: &str) -> Result<Url, SupabaseError> {
        self.endpoint(&format!("object/public/{bucket}/{path}"))
    }
}
