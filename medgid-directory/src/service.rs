//! Cache-or-scrape lookup with per-slug single-flight.
//!
//! [`DirectoryService`] is the one entry point the conversation layer uses.
//! Concurrent lookups for the same slug share one scrape: the per-slug token
//! is held across the whole check-miss-scrape-put section, so the second
//! caller wakes up to a fresh cache entry instead of fetching again.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::cache::DirectoryCache;
use crate::error::DirectoryError;
use crate::progress::ProgressCallback;
use crate::record::ProviderRecord;
use crate::registry::Specialization;

/// Source of provider listings on a cache miss. [`crate::ProviderScraper`] is
/// the production implementation; tests substitute counting fakes.
#[async_trait]
pub trait ProviderSource: Send + Sync {
    async fn fetch(
        &self,
        specialization: &Specialization,
        progress: &mut ProgressCallback,
    ) -> Result<Vec<ProviderRecord>, DirectoryError>;
}

/// TTL cache in front of a [`ProviderSource`], with per-slug single-flight.
pub struct DirectoryService {
    cache: DirectoryCache,
    source: Arc<dyn ProviderSource>,
    flights: Mutex<HashMap<&'static str, Arc<Mutex<()>>>>,
}

impl DirectoryService {
    pub fn new(cache: DirectoryCache, source: Arc<dyn ProviderSource>) -> Self {
        Self {
            cache,
            source,
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh providers for a specialization: cache when fresh, otherwise one
    /// scrape shared by every concurrent caller of the same slug.
    ///
    /// Empty scrape results are returned but not cached, so the next lookup
    /// retries. A failed cache write degrades to returning the scraped list.
    #[instrument(skip_all, fields(slug = specialization.slug))]
    pub async fn lookup(
        &self,
        specialization: &Specialization,
        progress: &mut ProgressCallback,
    ) -> Result<Vec<ProviderRecord>, DirectoryError> {
        let flight = self.flight_token(specialization.slug).await;
        let _in_flight = flight.lock().await;

        if let Some(providers) = self.cache.get(specialization.slug).await {
            info!(slug = specialization.slug, providers = providers.len(), "Served from cache");
            return Ok(providers);
        }

        let providers = self.source.fetch(specialization, progress).await?;
        if providers.is_empty() {
            return Ok(providers);
        }
        if let Err(e) = self.cache.put(specialization.slug, &providers).await {
            warn!(slug = specialization.slug, error = %e, "Cache write failed, serving uncached result");
        }
        Ok(providers)
    }

    /// The mutual-exclusion token for one slug, created on first use.
    async fn flight_token(&self, slug: &'static str) -> Arc<Mutex<()>> {
        let mut flights = self.flights.lock().await;
        flights.entry(slug).or_default().clone()
    }
}
