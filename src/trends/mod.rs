//! Trends service adapter
//!
//! The dashboard talks to the trends service only through [`TrendsSource`].
//! [`GoogleTrendsClient`] implements it over the service's web protocol;
//! handles are obtained through a [`ClientCache`] so that repeated runs in
//! one process reuse the same session for a bounded time.

pub mod cache;
pub mod client;
pub mod protocol;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::TrendsConfig;
use crate::models::{
    QueryParameters, RegionResult, RelatedQueryResult, Resolution, TimeSeriesResult,
};
use crate::utils::error::FetchError;

pub use cache::ClientCache;
pub use client::GoogleTrendsClient;

/// Shared handle to a trends source
pub type ClientHandle = Arc<dyn TrendsSource>;

/// The three lookups the dashboard performs
#[async_trait]
pub trait TrendsSource: Send + Sync {
    /// Interest over time, one column per keyword
    ///
    /// Returns an empty result when the service has no data.
    async fn fetch_time_series(
        &self,
        params: &QueryParameters,
    ) -> Result<TimeSeriesResult, FetchError>;

    /// Interest aggregated at the given geographic resolution
    async fn fetch_by_region(
        &self,
        params: &QueryParameters,
        resolution: Resolution,
    ) -> Result<RegionResult, FetchError>;

    /// Top and rising related queries per keyword
    async fn fetch_related_queries(
        &self,
        params: &QueryParameters,
    ) -> Result<RelatedQueryResult, FetchError>;
}

/// Get a handle for the configured locale and timezone, building a
/// [`GoogleTrendsClient`] when the cache has none or it expired
///
/// # Errors
///
/// Returns `FetchError` if the HTTP client cannot be created
pub fn initialize(cache: &mut ClientCache, config: &TrendsConfig) -> Result<ClientHandle, FetchError> {
    cache.get_or_try_init(&config.locale, config.timezone_offset, || {
        let client = GoogleTrendsClient::new(config)?;
        Ok(Arc::new(client) as ClientHandle)
    })
}
