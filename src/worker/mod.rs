//! Offline cache controller.
//!
//! Drives the install / activate lifecycle of one cache version and answers
//! every intercepted request according to its resource class:
//!
//! | class        | strategy                                   |
//! |--------------|--------------------------------------------|
//! | static       | cache-first, app shell fallback            |
//! | image        | cache-first                                |
//! | data         | network-first, cached copy when offline    |
//! | cross-origin | network only                               |
//! | other        | network-first into the catch-all generation |

mod classify;
mod manifest;

use std::fmt;
use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::cache::{CacheLayer, CacheResult, CacheStorage};
use crate::config::Config;
use crate::error::{FetchError, InstallError, LifecycleError};
use crate::net::{Network, Request, Response};

pub use classify::ResourceClass;
pub use manifest::{AssetManifest, Generations};

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
  /// Created, nothing installed yet
  Parsed,
  /// Eagerly populating the new generations
  Installing,
  /// Installed; the previous version's generations still serve
  Waiting,
  /// Purging stale generations
  Activating,
  /// Intercepting requests with the current generations
  Active,
  /// Install failed; a new install may be attempted
  Redundant,
}

impl fmt::Display for LifecycleState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Self::Parsed => "parsed",
      Self::Installing => "installing",
      Self::Waiting => "waiting",
      Self::Activating => "activating",
      Self::Active => "active",
      Self::Redundant => "redundant",
    };
    f.write_str(label)
  }
}

/// Background agent answering requests from versioned generations or the network.
pub struct CacheController<S: CacheStorage, N: Network> {
  layer: CacheLayer<S>,
  network: Arc<N>,
  manifest: AssetManifest,
  generations: Generations,
  state: LifecycleState,
}

impl<S: CacheStorage, N: Network> CacheController<S, N> {
  pub fn new(storage: Arc<S>, network: Arc<N>, config: &Config) -> Self {
    let layer = CacheLayer::from_shared(storage).with_network_timeout(config.cache.network_timeout());

    Self {
      layer,
      network,
      manifest: AssetManifest::new(config.origin.clone(), &config.assets),
      generations: Generations::new(&config.cache),
      state: LifecycleState::Parsed,
    }
  }

  pub fn state(&self) -> LifecycleState {
    self.state
  }

  pub fn generations(&self) -> &Generations {
    &self.generations
  }

  pub fn manifest(&self) -> &AssetManifest {
    &self.manifest
  }

  pub fn storage(&self) -> &S {
    self.layer.storage()
  }

  /// Pick up a version installed by an earlier run.
  ///
  /// Becomes active without reinstalling when every eagerly populated
  /// generation of this version already exists. Stale generations left by an
  /// activation that never finished are purged first. Returns whether it did.
  pub fn resume(&mut self) -> Result<bool> {
    if self.state != LifecycleState::Parsed {
      return Ok(self.state == LifecycleState::Active);
    }

    for class in ResourceClass::INSTALLED {
      let Some(generation) = self.generations.for_class(class) else {
        continue;
      };
      if !self.storage().has_generation(&generation.to_string())? {
        return Ok(false);
      }
    }

    let purged = self.purge_stale()?;
    info!(
      version = self.generations.version(),
      purged = purged.len(),
      "resuming installed version"
    );
    self.state = LifecycleState::Active;
    Ok(true)
  }

  /// Eagerly populate the static, image and data generations.
  ///
  /// Each class is all-or-nothing: its generation is only written once every
  /// listed asset has been fetched with status 200. The first failure is
  /// returned and the controller becomes redundant.
  pub async fn install(&mut self) -> Result<(), InstallError> {
    match self.state {
      LifecycleState::Parsed | LifecycleState::Redundant => {}
      state => {
        return Err(
          LifecycleError {
            event: "install",
            state,
          }
          .into(),
        )
      }
    }

    self.state = LifecycleState::Installing;
    info!(version = self.generations.version(), "installing");

    let result = try_join_all(ResourceClass::INSTALLED.map(|class| self.populate(class))).await;

    match result {
      Ok(_) => {
        self.state = LifecycleState::Waiting;
        info!(version = self.generations.version(), "installed");
        Ok(())
      }
      Err(e) => {
        self.state = LifecycleState::Redundant;
        warn!(version = self.generations.version(), "install failed: {e}");
        Err(e)
      }
    }
  }

  async fn populate(&self, class: ResourceClass) -> Result<(), InstallError> {
    let Some(generation) = self.generations.for_class(class) else {
      return Ok(());
    };
    let generation = generation.to_string();

    let fetches = self.manifest.install_list(class).iter().map(|path| {
      let generation = generation.as_str();
      async move {
        let request = Request::get_relative(&self.manifest.origin, path).map_err(|e| {
          InstallError::Fetch {
            generation: generation.to_string(),
            url: path.clone(),
            source: FetchError::network(path, e),
          }
        })?;

        let response = self
          .network
          .fetch(&request)
          .await
          .map_err(|source| InstallError::Fetch {
            generation: generation.to_string(),
            url: request.url.to_string(),
            source,
          })?;

        if !response.is_cacheable() {
          return Err(InstallError::BadStatus {
            generation: generation.to_string(),
            url: request.url.to_string(),
            status: response.status,
          });
        }

        Ok::<_, InstallError>((request, response))
      }
    });

    let entries = try_join_all(fetches).await?;

    self
      .storage()
      .put_all(&generation, &entries)
      .map_err(|e| InstallError::Storage {
        generation: generation.clone(),
        reason: e.to_string(),
      })?;

    info!(%generation, entries = entries.len(), "generation populated");
    Ok(())
  }

  /// Delete every stale generation of this controller, then claim clients.
  ///
  /// Foreign generations (other namespaces or suffixes) are left alone.
  /// Returns the names that were deleted.
  pub async fn activate(&mut self) -> Result<Vec<String>> {
    if self.state != LifecycleState::Waiting {
      return Err(eyre!(LifecycleError {
        event: "activate",
        state: self.state,
      }));
    }

    self.state = LifecycleState::Activating;

    match self.purge_stale() {
      Ok(deleted) => {
        self.state = LifecycleState::Active;
        info!(
          version = self.generations.version(),
          purged = deleted.len(),
          "activated, claiming clients"
        );
        Ok(deleted)
      }
      Err(e) => {
        self.state = LifecycleState::Waiting;
        Err(e)
      }
    }
  }

  fn purge_stale(&self) -> Result<Vec<String>> {
    let mut deleted = Vec::new();
    for name in self.storage().generation_names()? {
      if self.generations.is_stale(&name) {
        self.storage().delete_generation(&name)?;
        debug!(generation = %name, "deleted stale generation");
        deleted.push(name);
      }
    }
    Ok(deleted)
  }

  /// Answer one intercepted request.
  ///
  /// The returned future resolves only after a cache hit or a completed
  /// network attempt (plus any fallback lookup).
  pub async fn handle(&self, request: &Request) -> Result<CacheResult<Response>, FetchError> {
    let fetch = || self.network.fetch(request);

    if self.state != LifecycleState::Active {
      debug!(url = %request.url, state = %self.state, "not controlling, passing through");
      return self.layer.network_only(fetch).await;
    }
    if !request.is_get() {
      return self.layer.network_only(fetch).await;
    }

    let class = self.manifest.classify(request);
    debug!(url = %request.url, %class, "intercepted");

    match class {
      ResourceClass::Static => self.serve_static(request).await,
      ResourceClass::Image => {
        let images = self.generations.images.to_string();
        self.layer.cache_first(&images, request, fetch).await
      }
      ResourceClass::Data => {
        let data = self.generations.data.to_string();
        self
          .layer
          .network_first(&data, &[data.as_str()], request, fetch)
          .await
      }
      ResourceClass::CrossOrigin => self.layer.network_only(fetch).await,
      ResourceClass::Other => {
        let catch_all = self.generations.catch_all.to_string();
        let current = self.generations.current_names();
        let fallback: Vec<&str> = current.iter().map(String::as_str).collect();
        self
          .layer
          .network_first(&catch_all, &fallback, request, fetch)
          .await
      }
    }
  }

  async fn serve_static(&self, request: &Request) -> Result<CacheResult<Response>, FetchError> {
    let generation = self.generations.static_assets.to_string();

    let err = match self
      .layer
      .cache_first(&generation, request, || self.network.fetch(request))
      .await
    {
      Ok(result) => return Ok(result),
      Err(err) => err,
    };

    for document in [self.manifest.fallback_document.as_str(), "/"] {
      let Ok(shell) = Request::get_relative(&self.manifest.origin, document) else {
        continue;
      };
      if let Some(cached) = self.layer.lookup(&[generation.as_str()], &shell) {
        warn!(url = %request.url, fallback = %shell.url, "serving app shell: {err}");
        return Ok(CacheResult::fallback(cached.response, cached.cached_at));
      }
    }

    Err(err)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheSource, MemoryStorage};
  use crate::config::{AssetsConfig, CacheConfig};
  use crate::net::mock::MockNetwork;
  use reqwest::Method;
  use std::time::Duration;
  use url::Url;

  const ORIGIN: &str = "http://portal.test";

  fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
  }

  fn request(path: &str) -> Request {
    Request::get(Url::parse(&url(path)).unwrap())
  }

  fn config(version: &str) -> Config {
    Config {
      origin: Url::parse(ORIGIN).unwrap(),
      cache: CacheConfig {
        version: version.to_string(),
        ..CacheConfig::default()
      },
      assets: AssetsConfig {
        static_assets: vec!["/".to_string(), "/index.html".to_string()],
        images: vec!["/assets/logo.png".to_string()],
        data: vec!["/portal-data.json".to_string()],
        ..AssetsConfig::default()
      },
      ..Config::default()
    }
  }

  fn seed(network: &MockNetwork, catalog: &str) {
    network.respond(&url("/"), 200, b"<html>root</html>".to_vec());
    network.respond(&url("/index.html"), 200, b"<html>index</html>".to_vec());
    network.respond(&url("/assets/logo.png"), 200, b"PNG".to_vec());
    network.respond(&url("/portal-data.json"), 200, catalog.as_bytes().to_vec());
  }

  type Controller = CacheController<MemoryStorage, MockNetwork>;

  async fn active(storage: &Arc<MemoryStorage>, network: &Arc<MockNetwork>, version: &str) -> Controller {
    let mut controller = CacheController::new(storage.clone(), network.clone(), &config(version));
    controller.install().await.unwrap();
    controller.activate().await.unwrap();
    controller
  }

  fn total_entries(storage: &MemoryStorage) -> usize {
    storage
      .generation_names()
      .unwrap()
      .iter()
      .map(|name| storage.entry_count(name).unwrap())
      .sum()
  }

  fn setup() -> (Arc<MemoryStorage>, Arc<MockNetwork>) {
    let network = Arc::new(MockNetwork::new());
    seed(&network, r#"{"categories":[{"id":"hr","name":"HR","cards":[]}]}"#);
    (Arc::new(MemoryStorage::new()), network)
  }

  #[tokio::test]
  async fn test_install_populates_every_class() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;

    assert_eq!(controller.state(), LifecycleState::Active);
    assert_eq!(storage.entry_count("hopeignites-static-v1").unwrap(), 2);
    assert_eq!(storage.entry_count("hopeignites-images-v1").unwrap(), 1);
    assert_eq!(storage.entry_count("hopeignites-data-v1").unwrap(), 1);
  }

  #[tokio::test]
  async fn test_install_failure_is_all_or_nothing() {
    let (storage, network) = setup();
    network.fail(&url("/index.html"));

    let mut controller = CacheController::new(storage.clone(), network.clone(), &config("v1"));
    let err = controller.install().await.unwrap_err();

    assert!(matches!(err, InstallError::Fetch { .. }), "{err}");
    assert_eq!(controller.state(), LifecycleState::Redundant);
    assert!(!storage.has_generation("hopeignites-static-v1").unwrap());
    assert!(controller.activate().await.is_err());

    // Retry re-fetches the whole list, not just the asset that failed
    network.respond(&url("/index.html"), 200, b"<html>index</html>".to_vec());
    controller.install().await.unwrap();
    assert_eq!(network.calls_to(&url("/")), 2);
    assert_eq!(storage.entry_count("hopeignites-static-v1").unwrap(), 2);
  }

  #[tokio::test]
  async fn test_install_rejects_error_status() {
    let (storage, network) = setup();
    network.respond(&url("/assets/logo.png"), 404, b"missing".to_vec());

    let mut controller = CacheController::new(storage.clone(), network, &config("v1"));
    let err = controller.install().await.unwrap_err();

    assert!(matches!(err, InstallError::BadStatus { status: 404, .. }), "{err}");
    assert!(!storage.has_generation("hopeignites-images-v1").unwrap());
  }

  #[tokio::test]
  async fn test_activation_purges_stale_generations_only() {
    let (storage, network) = setup();
    active(&storage, &network, "v1").await;
    let page = Response::new(url("/about.html"), 200, b"about".to_vec());
    for name in ["hopeignites-app-launcher-v1", "unrelated-cache", "hopeignites-fonts-v1"] {
      storage.put(name, &request("/about.html"), &page).unwrap();
    }

    let mut controller = CacheController::new(storage.clone(), network.clone(), &config("v2"));
    controller.install().await.unwrap();
    let mut deleted = controller.activate().await.unwrap();
    deleted.sort();

    assert_eq!(
      deleted,
      vec![
        "hopeignites-app-launcher-v1",
        "hopeignites-data-v1",
        "hopeignites-images-v1",
        "hopeignites-static-v1",
      ]
    );
    let names = storage.generation_names().unwrap();
    assert!(names.contains(&"unrelated-cache".to_string()));
    assert!(names.contains(&"hopeignites-fonts-v1".to_string()));
    assert!(names.iter().all(|n| !n.ends_with("-v1") || n == "hopeignites-fonts-v1"));
  }

  #[tokio::test]
  async fn test_lifecycle_order_is_enforced() {
    let (storage, network) = setup();
    let mut controller = CacheController::new(storage, network, &config("v1"));

    assert!(controller.activate().await.is_err());
    controller.install().await.unwrap();
    assert_eq!(controller.state(), LifecycleState::Waiting);
    assert!(matches!(
      controller.install().await,
      Err(InstallError::Lifecycle(_))
    ));
  }

  #[tokio::test]
  async fn test_resume_installed_version() {
    let (storage, network) = setup();
    active(&storage, &network, "v1").await;

    let mut same = CacheController::new(storage.clone(), network.clone(), &config("v1"));
    assert!(same.resume().unwrap());
    assert_eq!(same.state(), LifecycleState::Active);

    let mut newer = CacheController::new(storage, network, &config("v2"));
    assert!(!newer.resume().unwrap());
    assert_eq!(newer.state(), LifecycleState::Parsed);
  }

  #[tokio::test]
  async fn test_resume_purges_version_left_waiting() {
    let (storage, network) = setup();
    active(&storage, &network, "v1").await;

    // v2 installs but the run ends before activation
    let mut upgrade = CacheController::new(storage.clone(), network.clone(), &config("v2"));
    upgrade.install().await.unwrap();
    drop(upgrade);
    assert!(storage.has_generation("hopeignites-static-v1").unwrap());

    let mut resumed = CacheController::new(storage.clone(), network, &config("v2"));
    assert!(resumed.resume().unwrap());
    assert_eq!(resumed.state(), LifecycleState::Active);

    let names = storage.generation_names().unwrap();
    assert!(names.iter().all(|name| !name.ends_with("-v1")), "{names:?}");
    assert!(storage.has_generation("hopeignites-data-v2").unwrap());
  }

  #[tokio::test]
  async fn test_uncontrolled_requests_pass_through() {
    let (storage, network) = setup();
    let controller = CacheController::new(storage.clone(), network.clone(), &config("v1"));

    let served = controller.handle(&request("/about.html")).await.unwrap();
    assert_eq!(served.source, CacheSource::Network);
    assert_eq!(total_entries(&storage), 0);
  }

  #[tokio::test]
  async fn test_static_cache_first_is_idempotent() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let before = network.calls_to(&url("/index.html"));

    let first = controller.handle(&request("/index.html")).await.unwrap();
    let second = controller.handle(&request("/index.html")).await.unwrap();

    assert_eq!(first.source, CacheSource::Cache);
    assert_eq!(first.data, second.data);
    assert_eq!(first.data.body, b"<html>index</html>".to_vec());
    assert_eq!(network.calls_to(&url("/index.html")), before);
  }

  #[tokio::test]
  async fn test_static_miss_is_fetched_and_stored() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let request = request("/");
    storage.delete_generation("hopeignites-static-v1").unwrap();

    let served = controller.handle(&request).await.unwrap();

    assert_eq!(served.source, CacheSource::Network);
    assert!(storage
      .match_entry("hopeignites-static-v1", &request)
      .unwrap()
      .is_some());
  }

  #[tokio::test]
  async fn test_static_falls_back_to_app_shell() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let static_gen = "hopeignites-static-v1";
    let shell = storage.match_entry(static_gen, &request("/index.html")).unwrap().unwrap();
    storage.delete_generation(static_gen).unwrap();
    storage.put(static_gen, &request("/index.html"), &shell.response).unwrap();
    network.set_offline(true);

    let served = controller.handle(&request("/")).await.unwrap();

    assert_eq!(served.source, CacheSource::Fallback);
    assert_eq!(served.data.body, b"<html>index</html>".to_vec());
  }

  #[tokio::test]
  async fn test_static_without_shell_propagates() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    storage.delete_generation("hopeignites-static-v1").unwrap();
    network.set_offline(true);

    let err = controller.handle(&request("/")).await.unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }));
  }

  #[tokio::test]
  async fn test_images_cache_only_successful_responses() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let icon = request("/assets/app-icons/mail.png");
    let broken = request("/assets/app-icons/broken.png");
    network.respond(&url("/assets/app-icons/mail.png"), 200, b"MAIL".to_vec());

    let first = controller.handle(&icon).await.unwrap();
    let second = controller.handle(&icon).await.unwrap();
    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(first.data.body, second.data.body);
    assert_eq!(network.calls_to(&url("/assets/app-icons/mail.png")), 1);

    let missing = controller.handle(&broken).await.unwrap();
    assert_eq!(missing.data.status, 404);
    assert!(storage.match_entry("hopeignites-images-v1", &broken).unwrap().is_none());

    network.set_offline(true);
    assert!(controller.handle(&broken).await.is_err());
    assert!(storage.match_entry("hopeignites-static-v1", &icon).unwrap().is_none());
  }

  #[tokio::test]
  async fn test_data_prefers_fresh_network_copy() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let data = request("/portal-data.json");
    network.respond(&url("/portal-data.json"), 200, br#"{"categories":[]}"#.to_vec());

    let served = controller.handle(&data).await.unwrap();
    let stored = storage.match_entry("hopeignites-data-v1", &data).unwrap().unwrap();

    assert_eq!(served.source, CacheSource::Network);
    assert_eq!(served.data.body, br#"{"categories":[]}"#.to_vec());
    assert_eq!(stored.response, served.data);
  }

  #[tokio::test]
  async fn test_data_error_status_keeps_good_copy() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let data = request("/portal-data.json");
    let good = storage.match_entry("hopeignites-data-v1", &data).unwrap().unwrap();
    network.respond(&url("/portal-data.json"), 500, b"oops".to_vec());

    let served = controller.handle(&data).await.unwrap();
    let stored = storage.match_entry("hopeignites-data-v1", &data).unwrap().unwrap();

    assert_eq!(served.data.status, 500);
    assert_eq!(stored.response, good.response);
  }

  #[tokio::test]
  async fn test_data_falls_back_to_cache_when_offline() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let data = request("/portal-data.json");
    network.set_offline(true);

    let served = controller.handle(&data).await.unwrap();
    assert_eq!(served.source, CacheSource::Offline);
    assert!(served.cached_at.is_some());

    storage.delete_generation("hopeignites-data-v1").unwrap();
    assert!(controller.handle(&data).await.is_err());
  }

  #[tokio::test]
  async fn test_data_timeout_triggers_fallback() {
    let (storage, network) = setup();
    let mut config = config("v1");
    config.cache.network_timeout_secs = Some(1);
    let mut controller = CacheController::new(storage.clone(), network.clone(), &config);
    controller.install().await.unwrap();
    controller.activate().await.unwrap();
    network.set_hanging(true);

    let served = tokio::time::timeout(
      Duration::from_secs(5),
      controller.handle(&request("/portal-data.json")),
    )
    .await
    .expect("fallback should resolve before the outer timeout")
    .unwrap();

    assert_eq!(served.source, CacheSource::Offline);
  }

  #[tokio::test]
  async fn test_cross_origin_bypasses_cache() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let before = total_entries(&storage);
    network.set_offline(true);

    let external = Request::get(Url::parse("https://api.ipify.org/?format=json").unwrap());
    let err = controller.handle(&external).await.unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }));
    assert_eq!(network.calls_to("https://api.ipify.org/?format=json"), 1);
    assert_eq!(total_entries(&storage), before);

    network.set_offline(false);
    network.respond("https://api.ipify.org/?format=json", 200, br#"{"ip":"1.2.3.4"}"#.to_vec());
    let served = controller.handle(&external).await.unwrap();
    assert_eq!(served.source, CacheSource::Network);
    assert_eq!(total_entries(&storage), before);
  }

  #[tokio::test]
  async fn test_other_requests_use_catch_all() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let page = request("/tech/");
    network.respond(&url("/tech/"), 200, b"tech".to_vec());

    controller.handle(&page).await.unwrap();

    assert!(storage.match_entry("hopeignites-app-launcher-v1", &page).unwrap().is_some());
    assert_eq!(storage.entry_count("hopeignites-static-v1").unwrap(), 2);
    assert_eq!(storage.entry_count("hopeignites-images-v1").unwrap(), 1);
    assert_eq!(storage.entry_count("hopeignites-data-v1").unwrap(), 1);

    network.set_offline(true);
    let served = controller.handle(&page).await.unwrap();
    assert_eq!(served.source, CacheSource::Offline);
    assert_eq!(served.data.body, b"tech".to_vec());
    assert!(controller.handle(&request("/never-seen")).await.is_err());
  }

  #[tokio::test]
  async fn test_non_get_goes_straight_to_network() {
    let (storage, network) = setup();
    let controller = active(&storage, &network, "v1").await;
    let before = total_entries(&storage);
    network.respond(&url("/feedback"), 200, b"ok".to_vec());

    let post = Request::new(Method::POST, Url::parse(&url("/feedback")).unwrap());
    let served = controller.handle(&post).await.unwrap();

    assert_eq!(served.source, CacheSource::Network);
    assert_eq!(total_entries(&storage), before);
  }

  #[tokio::test]
  async fn test_version_upgrade_scenario() {
    let (storage, network) = setup();
    active(&storage, &network, "v1").await;
    assert!(storage.has_generation("hopeignites-data-v1").unwrap());

    network.respond(&url("/portal-data.json"), 200, br#"{"categories":[]}"#.to_vec());
    let controller = active(&storage, &network, "v2").await;

    let served = controller.handle(&request("/portal-data.json")).await.unwrap();
    assert_eq!(served.source, CacheSource::Network);
    assert_eq!(served.data.body, br#"{"categories":[]}"#.to_vec());
    assert!(storage
      .generation_names()
      .unwrap()
      .iter()
      .all(|name| !name.ends_with("-v1")));
  }
}
