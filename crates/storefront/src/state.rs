//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::StorefrontConfig;
use crate::extractor::{ExtractorClient, ExtractorError};
use crate::midtrans::{MidtransError, SnapClient};
use crate::supabase::{StorageClient, SupabaseClient, SupabaseError};

/// Error building an upstream client.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("supabase client: {0}")]
    Supabase(#[from] SupabaseError),
    #[error("midtrans client: {0}")]
    Midtrans(#[from] MidtransError),
    #[error("extractor client: {0}")]
    Extractor(#[from] ExtractorError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and one client per upstream service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    database: SupabaseClient,
    storage: StorageClient,
    snap: SnapClient,
    extractor: ExtractorClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if any upstream client cannot be built from the
    /// configuration.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let database = SupabaseClient::new(&config.supabase)?;
        let storage = StorageClient::new(&config.supabase)?;
        let snap = SnapClient::new(&config.midtrans)?;
        let extractor = ExtractorClient::new(&config.extractor)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                database,
                storage,
                snap,
                extractor,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Supabase REST client.
    #[must_use]
    pub fn database(&self) -> &SupabaseClient {
        &self.inner.database
    }

    /// Get a reference to the Supabase Storage client.
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    /// Get a reference to the Midtrans Snap client.
    #[must_use]
    pub fn snap(&self) -> &SnapClient {
        &self.inner.snap
    }

    /// Get a reference to the AI extraction client.
    #[must_use]
    pub fn extractor(&self) -> &ExtractorClient {
        &self.inner.extractor
    }
}
