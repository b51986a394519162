use color_eyre::{eyre::eyre, Result};
use futures::future::BoxFuture;
use tracing::debug;

use crate::error::FetchError;

use super::types::{Request, Response};
use super::Network;

/// Network backed by a reqwest client.
#[derive(Clone)]
pub struct HttpNetwork {
  client: reqwest::Client,
}

impl HttpNetwork {
  pub fn new() -> Result<Self> {
    // api.github.com rejects requests without a user agent
    let client = reqwest::Client::builder()
      .user_agent(concat!("portal-cache/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;
    Ok(Self { client })
  }

  async fn send(&self, request: &Request) -> std::result::Result<Response, FetchError> {
    let url = request.url.to_string();
    debug!(method = %request.method, %url, "network fetch");

    let response = self
      .client
      .request(request.method.clone(), request.url.clone())
      .send()
      .await
      .map_err(|e| FetchError::network(&url, e))?;

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let headers: Vec<(String, String)> = response
      .headers()
      .iter()
      .filter_map(|(name, value)| {
        value
          .to_str()
          .ok()
          .map(|v| (name.as_str().to_string(), v.to_string()))
      })
      .collect();

    let body = response
      .bytes()
      .await
      .map_err(|e| FetchError::network(&url, e))?;

    Ok(
      headers
        .into_iter()
        .fold(Response::new(final_url, status, body.to_vec()), |response, (name, value)| {
          response.with_header(name, value)
        }),
    )
  }
}

impl Network for HttpNetwork {
  fn fetch<'a>(
    &'a self,
    request: &'a Request,
  ) -> BoxFuture<'a, std::result::Result<Response, FetchError>> {
    Box::pin(self.send(request))
  }
}
