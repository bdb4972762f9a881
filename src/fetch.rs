//! Fetch-with-fallback wrapper around a single upstream data source.
//!
//! A [`DataSource`] answers from, in order: a fresh cache entry, a live
//! upstream call (cached on success), or its failure policy. Graceful sources
//! substitute a static payload; hard-fail sources surface a [`SourceError`].

use crate::cache::CacheStore;
use crate::config::Credential;
use crate::upstream::UpstreamError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub enum FailurePolicy<V> {
    Degrade(fn() -> V),
    HardFail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    MissingCredential,
    UpstreamFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Live,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone)]
pub struct Fetched<V> {
    pub value: V,
    pub origin: Origin,
}

impl<V> Fetched<V> {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, Origin::Fallback(_))
    }

    pub fn is_cached(&self) -> bool {
        self.origin == Origin::Cache
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{service} API key not configured")]
    NotConfigured {
        service: &'static str,
        feature: &'static str,
        signup: Option<&'static str>,
    },
    #[error("{service} request failed: {source}")]
    Upstream {
        service: &'static str,
        feature: &'static str,
        #[source]
        source: UpstreamError,
    },
}

pub struct DataSource<V> {
    pub service: &'static str,
    pub feature: &'static str,
    signup: Option<&'static str>,
    credential: Option<Credential>,
    ttl: Option<Duration>,
    timeout: Duration,
    policy: FailurePolicy<V>,
    cache: Option<CacheStore<V>>,
}

impl<V> DataSource<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// A hard-failing, uncached source that needs no credential.
    pub fn new(service: &'static str, feature: &'static str) -> Self {
        Self {
            service,
            feature,
            signup: None,
            credential: None,
            ttl: None,
            timeout: DEFAULT_TIMEOUT,
            policy: FailurePolicy::HardFail,
            cache: None,
        }
    }

    pub fn credential(mut self, credential: Credential, signup: &'static str) -> Self {
        self.credential = Some(credential);
        self.signup = Some(signup);
        self
    }

    pub fn cached_for(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self.cache = Some(CacheStore::new());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn degrade_to(mut self, fallback: fn() -> V) -> Self {
        self.policy = FailurePolicy::Degrade(fallback);
        self
    }

    #[cfg(test)]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Fetch from a source that needs no credential.
    pub async fn fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Fetched<V>, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, UpstreamError>>,
    {
        self.fetch_with_key(key, |_| fetch()).await
    }

    /// Fetch from a source; `fetch` receives the configured secret (empty when
    /// the source takes none) and is only invoked on a cache miss with a
    /// usable credential.
    pub async fn fetch_with_key<F, Fut>(
        &self,
        key: &str,
        fetch: F,
    ) -> Result<Fetched<V>, SourceError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<V, UpstreamError>>,
    {
        if let Some(value) = self.fresh(key).await {
            tracing::debug!(service = self.service, key, "cache hit");
            return Ok(Fetched {
                value,
                origin: Origin::Cache,
            });
        }

        let secret = match &self.credential {
            None => String::new(),
            Some(credential) => match credential.secret() {
                Some(secret) => secret.to_string(),
                None => {
                    tracing::warn!(
                        service = self.service,
                        credential = credential.status(),
                        "API key not configured, skipping upstream call"
                    );
                    return self.degrade(FallbackReason::MissingCredential).ok_or(
                        SourceError::NotConfigured {
                            service: self.service,
                            feature: self.feature,
                            signup: self.signup,
                        },
                    );
                }
            },
        };

        let result = match tokio::time::timeout(self.timeout, fetch(secret)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout),
        };

        match result {
            Ok(value) => {
                if let Some(cache) = &self.cache {
                    cache.put(key, value.clone()).await;
                }
                Ok(Fetched {
                    value,
                    origin: Origin::Live,
                })
            }
            Err(err) => {
                tracing::warn!(service = self.service, key, error = %err, "upstream call failed");
                self.degrade(FallbackReason::UpstreamFailed)
                    .ok_or(SourceError::Upstream {
                        service: self.service,
                        feature: self.feature,
                        source: err,
                    })
            }
        }
    }

    #[cfg(test)]
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    pub async fn cached_entries(&self) -> u64 {
        match &self.cache {
            Some(cache) => cache.len().await,
            None => 0,
        }
    }

    async fn fresh(&self, key: &str) -> Option<V> {
        let (cache, ttl) = (self.cache.as_ref()?, self.ttl?);
        cache
            .get(key)
            .await
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| entry.value)
    }

    fn degrade(&self, reason: FallbackReason) -> Option<Fetched<V>> {
        match self.policy {
            FailurePolicy::Degrade(fallback) => Some(Fetched {
                value: fallback(),
                origin: Origin::Fallback(reason),
            }),
            FailurePolicy::HardFail => None,
        }
    }
}
