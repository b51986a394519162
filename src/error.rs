//! Error types shared by the controller and the catalog store.

use std::time::Duration;

use thiserror::Error;

use crate::worker::LifecycleState;

/// Failure of a single intercepted fetch.
///
/// Returned to the caller only when no fallback response was available.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
  /// The network attempt itself failed (offline, DNS, connection reset).
  #[error("network request to {url} failed: {reason}")]
  Network { url: String, reason: String },

  /// The network attempt did not finish within the configured timeout.
  #[error("network request to {url} timed out after {after:?}")]
  Timeout { url: String, after: Duration },
}

impl FetchError {
  pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
    Self::Network {
      url: url.into(),
      reason: reason.to_string(),
    }
  }
}

/// Failure while eagerly populating the generations of a new version.
#[derive(Debug, Clone, Error)]
pub enum InstallError {
  #[error("failed to fetch {url} for {generation}: {source}")]
  Fetch {
    generation: String,
    url: String,
    #[source]
    source: FetchError,
  },

  #[error("{url} for {generation} answered with status {status}")]
  BadStatus {
    generation: String,
    url: String,
    status: u16,
  },

  #[error("failed to write generation {generation}: {reason}")]
  Storage { generation: String, reason: String },

  #[error(transparent)]
  Lifecycle(#[from] LifecycleError),
}

/// An event arrived in a state that cannot accept it.
#[derive(Debug, Clone, Error)]
#[error("cannot {event} while {state}")]
pub struct LifecycleError {
  pub event: &'static str,
  pub state: LifecycleState,
}

/// Failure to produce a catalog snapshot.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
  /// The data asset could not be fetched and no cached copy exists.
  #[error("catalog could not be fetched: {0}")]
  Network(#[from] FetchError),

  /// The data asset answered with a non-success status.
  #[error("catalog request answered with status {0}")]
  Status(u16),

  /// The payload is not a catalog.
  #[error("catalog payload is malformed: {0}")]
  Malformed(String),
}
