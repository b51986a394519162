//! Catalog store: loads the launcher data asset and answers view queries.

mod types;
mod view;

use tracing::{debug, info};

use crate::cache::CacheStorage;
use crate::error::LoadError;
use crate::net::{Network, Request};
use crate::worker::CacheController;

pub use types::{Card, Catalog, Category};
pub use view::{icon_for_theme, icon_path, CatalogView, Selection};

impl Catalog {
  /// Decode and validate a data asset payload.
  pub fn from_json(body: &[u8]) -> Result<Self, LoadError> {
    let value: serde_json::Value =
      serde_json::from_slice(body).map_err(|e| LoadError::Malformed(e.to_string()))?;

    if !value.get("categories").is_some_and(|c| c.is_array()) {
      return Err(LoadError::Malformed(
        "expected a `categories` array".to_string(),
      ));
    }

    serde_json::from_value(value).map_err(|e| LoadError::Malformed(e.to_string()))
  }

  pub fn category(&self, id: &str) -> Option<&Category> {
    self.categories.iter().find(|c| c.id == id)
  }

  /// Every card from real categories, paired with its category.
  pub fn cards(&self) -> impl Iterator<Item = (&Category, &Card)> {
    self
      .categories
      .iter()
      .filter(|c| !c.is_view())
      .flat_map(|c| c.cards.iter().map(move |card| (c, card)))
  }
}

/// Fetch the data asset through the controller and decode it.
///
/// The request follows the data strategy: fresh from the network when
/// reachable, the last cached copy otherwise.
pub async fn load<S, N>(controller: &CacheController<S, N>) -> Result<Catalog, LoadError>
where
  S: CacheStorage,
  N: Network,
{
  let manifest = controller.manifest();
  let path = manifest
    .data
    .first()
    .ok_or_else(|| LoadError::Malformed("no data asset configured".to_string()))?;
  let request = Request::get_relative(&manifest.origin, path)
    .map_err(|e| LoadError::Malformed(e.to_string()))?;

  let served = controller.handle(&request).await?;
  debug!(url = %request.url, source = %served.source, "catalog fetched");

  if !served.data.is_success() {
    return Err(LoadError::Status(served.data.status));
  }

  let catalog = Catalog::from_json(&served.data.body)?;
  info!(
    categories = catalog.categories.len(),
    cards = catalog.cards().count(),
    "catalog loaded"
  );
  Ok(catalog)
}

#[cfg(test)]
mod tests {
  use super::types::Icon;
  use super::*;
  use crate::cache::MemoryStorage;
  use crate::config::Config;
  use crate::net::mock::MockNetwork;
  use std::sync::Arc;
  use url::Url;

  const DATA_URL: &str = "http://portal.test/portal-data.json";

  const SAMPLE: &str = r#"{
    "categories": [
      {"id": "all", "name": "All Applications", "cards": []},
      {"id": "hr", "name": "HR", "cards": [
        {"url": "https://hr.example.org", "title": "Payroll", "description": "Pay stubs",
         "icon": {"light": "payroll.png", "dark": "payroll-dark.png"}, "sso": true},
        {"url": "https://intranet.example.org", "title": "Intranet", "description": "News",
         "icon": "📰", "nhqOnly": true}
      ]}
    ],
    "quickLinks": [
      {"url": "https://status.example.org", "title": "Status"}
    ]
  }"#;

  #[test]
  fn test_from_json() {
    let catalog = Catalog::from_json(SAMPLE.as_bytes()).unwrap();
    assert_eq!(catalog.categories.len(), 2);

    let hr = catalog.category("hr").unwrap();
    assert!(hr.cards[0].sso);
    assert!(hr.cards[1].nhq_only);
    assert_eq!(hr.cards[1].icon, Some(Icon::Plain("📰".to_string())));
    assert_eq!(catalog.cards().count(), 2);
    assert_eq!(catalog.quick_links.len(), 1);
    assert_eq!(catalog.quick_links[0].title, "Status");

    let bare = Catalog::from_json(br#"{"categories": []}"#).unwrap();
    assert!(bare.quick_links.is_empty());
  }

  #[test]
  fn test_from_json_rejects_wrong_shape() {
    for body in [
      "not json",
      "[]",
      r#"{"categories": {}}"#,
      r#"{"apps": []}"#,
      r#"{"categories": [{"id": "x"}]}"#,
    ] {
      assert!(
        matches!(Catalog::from_json(body.as_bytes()), Err(LoadError::Malformed(_))),
        "{body} should be malformed"
      );
    }
  }

  async fn controller(network: Arc<MockNetwork>) -> CacheController<MemoryStorage, MockNetwork> {
    let mut config = Config {
      origin: Url::parse("http://portal.test").unwrap(),
      ..Config::default()
    };
    config.assets.static_assets.clear();
    config.assets.images.clear();

    network.respond(DATA_URL, 200, SAMPLE.as_bytes().to_vec());
    let mut controller = CacheController::new(Arc::new(MemoryStorage::new()), network, &config);
    controller.install().await.unwrap();
    controller.activate().await.unwrap();
    controller
  }

  #[tokio::test]
  async fn test_load_through_controller() {
    let network = Arc::new(MockNetwork::new());
    let ctl = controller(network.clone()).await;

    let catalog = load(&ctl).await.unwrap();
    assert_eq!(catalog.category("hr").map(|c| c.cards.len()), Some(2));

    // Offline loads still succeed from the cached data asset
    network.set_offline(true);
    assert_eq!(load(&ctl).await.unwrap(), catalog);
  }

  #[tokio::test]
  async fn test_load_errors() {
    let network = Arc::new(MockNetwork::new());
    let ctl = controller(network.clone()).await;

    network.respond(DATA_URL, 503, b"busy".to_vec());
    assert!(matches!(load(&ctl).await, Err(LoadError::Status(503))));

    network.respond(DATA_URL, 200, b"<html>".to_vec());
    assert!(matches!(load(&ctl).await, Err(LoadError::Malformed(_))));

    ctl.storage().delete_generation("hopeignites-data-v1.1").unwrap();
    network.set_offline(true);
    assert!(matches!(load(&ctl).await, Err(LoadError::Network(_))));
  }
}
