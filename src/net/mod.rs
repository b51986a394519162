//! Request/response snapshots and the network seam used by the controller.

mod client;
#[cfg(test)]
pub mod mock;
mod types;

use futures::future::BoxFuture;

use crate::error::FetchError;

pub use client::HttpNetwork;
pub use types::{Request, Response};

/// Anything that can perform a real network round trip.
pub trait Network: Send + Sync {
  fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>>;
}
