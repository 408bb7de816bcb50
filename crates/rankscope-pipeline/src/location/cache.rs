//! TTL cache for the location index.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use rankscope_dataforseo::{DataForSeoError, LocationItem, SeoDataProvider};

use crate::error::LocationError;
use crate::location::index::LocationIndex;

/// Where raw location rows come from.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn load(&self) -> Result<Vec<LocationItem>, DataForSeoError>;
}

/// Loads locations through an [`SeoDataProvider`].
pub struct ProviderLocations {
    provider: Arc<dyn SeoDataProvider>,
}

impl ProviderLocations {
    #[must_use]
    pub fn new(provider: Arc<dyn SeoDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl LocationSource for ProviderLocations {
    async fn load(&self) -> Result<Vec<LocationItem>, DataForSeoError> {
        self.provider.locations().await
    }
}

struct CachedIndex {
    index: Arc<LocationIndex>,
    loaded_at: Instant,
}

/// Holds the most recently built [`LocationIndex`] for `ttl`.
///
/// Concurrent callers that find the entry stale each rebuild it; the last
/// writer wins.
pub struct LocationCache {
    source: Arc<dyn LocationSource>,
    ttl: Duration,
    entry: RwLock<Option<CachedIndex>>,
}

impl LocationCache {
    #[must_use]
    pub fn new(source: Arc<dyn LocationSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Cached index if still fresh, otherwise a rebuilt one.
    ///
    /// # Errors
    ///
    /// See [`LocationCache::refresh`].
    pub async fn get(&self) -> Result<Arc<LocationIndex>, LocationError> {
        {
            let guard = self.entry.read().await;
            if let Some(cached) = guard.as_ref() {
                if cached.loaded_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(&cached.index));
                }
            }
        }
        self.refresh().await
    }

    /// Reloads from the source and replaces the cached index.
    ///
    /// # Errors
    ///
    /// [`LocationError::Provider`] when loading fails and
    /// [`LocationError::EmptyLocationTable`] when the source has no states.
    /// Either way the cached entry is dropped.
    pub async fn refresh(&self) -> Result<Arc<LocationIndex>, LocationError> {
        let built = match self.source.load().await {
            Ok(items) => LocationIndex::build(&items),
            Err(err) => Err(LocationError::from(err)),
        };

        match built {
            Ok(index) => {
                let index = Arc::new(index);
                tracing::info!(
                    states = index.states().len(),
                    cities = index.city_count(),
                    "location index rebuilt"
                );
                *self.entry.write().await = Some(CachedIndex {
                    index: Arc::clone(&index),
                    loaded_at: Instant::now(),
                });
                Ok(index)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load location data");
                self.invalidate().await;
                Err(err)
            }
        }
    }

    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }
}
