//! Cache layer that orchestrates caching strategies with network fetching.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::net::{Request, Response};

use super::storage::{CacheStorage, CachedEntry};
use super::traits::CacheResult;

/// Cache layer that implements the per-class strategies over a storage backend.
///
/// The layer never decides which generation a request belongs to; callers pass
/// the generation explicitly, so a strategy can only ever write to the one it
/// was given.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// Upper bound on network attempts of the network-first strategy
  network_timeout: Option<Duration>,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a cache layer over a storage backend shared with its owner.
  pub fn from_shared(storage: Arc<S>) -> Self {
    Self {
      storage,
      network_timeout: None,
    }
  }

  /// Give up on network-first attempts after `timeout` and use the cache.
  pub fn with_network_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.network_timeout = timeout;
    self
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Look up a request, treating an unreadable generation as a miss.
  pub fn lookup(&self, generations: &[&str], request: &Request) -> Option<CachedEntry> {
    match self.storage.match_any(generations, request) {
      Ok(hit) => hit,
      Err(e) => {
        warn!(url = %request.url, ?generations, "cache lookup failed: {e}");
        None
      }
    }
  }

  /// Write a response if it is eligible. A failed write is logged, not fatal.
  pub fn store(&self, generation: &str, request: &Request, response: &Response) {
    if !response.is_cacheable() {
      debug!(url = %request.url, status = response.status, "not caching response");
      return;
    }
    if let Err(e) = self.storage.put(generation, request, response) {
      warn!(url = %request.url, generation, "cache write failed: {e}");
    }
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Check the generation - on a hit, return without touching the network
  /// 2. On a miss, fetch from network
  /// 3. Store a status-200 response into the generation
  ///
  /// A network failure propagates; fallbacks are the caller's business.
  pub async fn cache_first<F, Fut>(
    &self,
    generation: &str,
    request: &Request,
    fetcher: F,
  ) -> Result<CacheResult<Response>, FetchError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Response, FetchError>>,
  {
    if let Some(cached) = self.lookup(&[generation], request) {
      debug!(url = %request.url, generation, "cache hit");
      return Ok(CacheResult::from_cache(cached.response, cached.cached_at));
    }

    let response = fetcher().await?;
    self.store(generation, request, &response);
    Ok(CacheResult::from_network(response))
  }

  /// Fetch with network-first strategy.
  ///
  /// 1. Always try the network first
  /// 2. Store a status-200 response into `generation`, replacing the old copy
  /// 3. On network failure, serve the first cached copy found in `fallback`
  /// 4. With nothing cached, the network failure propagates
  pub async fn network_first<F, Fut>(
    &self,
    generation: &str,
    fallback: &[&str],
    request: &Request,
    fetcher: F,
  ) -> Result<CacheResult<Response>, FetchError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Response, FetchError>>,
  {
    match self.attempt(request, fetcher).await {
      Ok(response) => {
        self.store(generation, request, &response);
        Ok(CacheResult::from_network(response))
      }
      Err(err) => match self.lookup(fallback, request) {
        Some(cached) => {
          debug!(url = %request.url, "network failed, serving cached copy: {err}");
          Ok(CacheResult::offline(cached.response, cached.cached_at))
        }
        None => Err(err),
      },
    }
  }

  /// Fetch straight from the network, bypassing every generation.
  pub async fn network_only<F, Fut>(&self, fetcher: F) -> Result<CacheResult<Response>, FetchError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Response, FetchError>>,
  {
    fetcher().await.map(CacheResult::from_network)
  }

  async fn attempt<F, Fut>(&self, request: &Request, fetcher: F) -> Result<Response, FetchError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Response, FetchError>>,
  {
    match self.network_timeout {
      Some(after) => tokio::time::timeout(after, fetcher())
        .await
        .map_err(|_| FetchError::Timeout {
          url: request.url.to_string(),
          after,
        })?,
      None => fetcher().await,
    }
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      network_timeout: self.network_timeout,
    }
  }
}
