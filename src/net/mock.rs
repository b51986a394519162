//! Scripted network for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use futures::future::BoxFuture;

use crate::error::FetchError;

use super::{Network, Request, Response};

/// Answers from a fixed route table; unknown URLs get a 404.
#[derive(Default)]
pub struct MockNetwork {
  routes: Mutex<HashMap<String, Route>>,
  calls: Mutex<Vec<String>>,
  offline: AtomicBool,
  hang: AtomicBool,
}

enum Route {
  Respond(u16, Vec<u8>),
  Fail,
}

impl MockNetwork {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn respond(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) {
    self
      .routes
      .lock()
      .unwrap()
      .insert(url.to_string(), Route::Respond(status, body.into()));
  }

  pub fn fail(&self, url: &str) {
    self
      .routes
      .lock()
      .unwrap()
      .insert(url.to_string(), Route::Fail);
  }

  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  /// Every fetch after this never completes.
  pub fn set_hanging(&self, hang: bool) {
    self.hang.store(hang, Ordering::SeqCst);
  }

  pub fn calls_to(&self, url: &str) -> usize {
    self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
  }

  pub fn total_calls(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

impl Network for MockNetwork {
  fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>> {
    Box::pin(async move {
      let url = request.url.to_string();
      self.calls.lock().unwrap().push(url.clone());

      if self.hang.load(Ordering::SeqCst) {
        futures::future::pending::<()>().await;
      }
      if self.offline.load(Ordering::SeqCst) {
        return Err(FetchError::network(&url, "offline"));
      }

      match self.routes.lock().unwrap().get(&url) {
        Some(Route::Respond(status, body)) => Ok(Response::new(&url, *status, body.clone())),
        Some(Route::Fail) => Err(FetchError::network(&url, "connection refused")),
        None => Ok(Response::new(&url, 404, b"not found".to_vec())),
      }
    })
  }
}
