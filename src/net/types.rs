use color_eyre::{eyre::eyre, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// An outbound request as seen by the cache controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
  pub method: Method,
  pub url: Url,
}

impl Request {
  pub fn new(method: Method, url: Url) -> Self {
    Self { method, url }
  }

  pub fn get(url: Url) -> Self {
    Self::new(Method::GET, url)
  }

  /// Build a GET request for a path (or absolute URL) relative to `origin`.
  pub fn get_relative(origin: &Url, target: &str) -> Result<Self> {
    let url = origin
      .join(target)
      .map_err(|e| eyre!("Invalid request target '{}': {}", target, e))?;
    Ok(Self::get(url))
  }

  pub fn is_get(&self) -> bool {
    self.method == Method::GET
  }

  /// Key used to match cached entries: method plus full URL.
  pub fn cache_key(&self) -> String {
    format!("{} {}", self.method, self.url)
  }
}

/// Snapshot of a response body and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
  pub url: String,
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl Response {
  pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
    Self {
      url: url.into(),
      status,
      headers: Vec::new(),
      body: body.into(),
    }
  }

  pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  /// Only responses with status 200 are ever written to a generation.
  pub fn is_cacheable(&self) -> bool {
    self.status == 200
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }
}
