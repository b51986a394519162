//! Asset lists and the generation names derived from them.

use url::Url;

use crate::cache::GenerationName;
use crate::config::{AssetsConfig, CacheConfig};

use super::classify::ResourceClass;

/// Fixed asset lists supplied when the controller starts.
#[derive(Debug, Clone)]
pub struct AssetManifest {
  pub origin: Url,
  pub static_assets: Vec<String>,
  pub image_prefix: String,
  pub images: Vec<String>,
  pub data: Vec<String>,
  pub fallback_document: String,
}

impl AssetManifest {
  pub fn new(origin: Url, assets: &AssetsConfig) -> Self {
    Self {
      origin,
      static_assets: assets.static_assets.clone(),
      image_prefix: assets.image_prefix.clone(),
      images: assets.images.clone(),
      data: assets.data.clone(),
      fallback_document: assets.fallback_document.clone(),
    }
  }

  /// Paths fetched eagerly on install, per class.
  pub fn install_list(&self, class: ResourceClass) -> &[String] {
    match class {
      ResourceClass::Static => &self.static_assets,
      ResourceClass::Image => &self.images,
      ResourceClass::Data => &self.data,
      ResourceClass::CrossOrigin | ResourceClass::Other => &[],
    }
  }
}

/// Current generation names for one namespace and version.
#[derive(Debug, Clone)]
pub struct Generations {
  pub static_assets: GenerationName,
  pub images: GenerationName,
  pub data: GenerationName,
  pub catch_all: GenerationName,
}

impl Generations {
  pub fn new(cache: &CacheConfig) -> Self {
    let name = |suffix: &str| GenerationName::new(&cache.namespace, suffix, &cache.version);
    Self {
      static_assets: name(ResourceClass::Static.suffix().unwrap_or("static")),
      images: name(ResourceClass::Image.suffix().unwrap_or("images")),
      data: name(ResourceClass::Data.suffix().unwrap_or("data")),
      catch_all: name(&cache.catch_all),
    }
  }

  pub fn namespace(&self) -> &str {
    &self.catch_all.namespace
  }

  pub fn version(&self) -> &str {
    &self.catch_all.version
  }

  /// Generation a class writes to; cross-origin requests have none.
  pub fn for_class(&self, class: ResourceClass) -> Option<&GenerationName> {
    match class {
      ResourceClass::Static => Some(&self.static_assets),
      ResourceClass::Image => Some(&self.images),
      ResourceClass::Data => Some(&self.data),
      ResourceClass::Other => Some(&self.catch_all),
      ResourceClass::CrossOrigin => None,
    }
  }

  pub fn all(&self) -> [&GenerationName; 4] {
    [&self.static_assets, &self.images, &self.data, &self.catch_all]
  }

  pub fn current_names(&self) -> Vec<String> {
    self.all().iter().map(|g| g.to_string()).collect()
  }

  /// Suffixes this controller owns, whatever the version.
  pub fn tracked_suffixes(&self) -> Vec<&str> {
    self.all().iter().map(|g| g.suffix.as_str()).collect()
  }

  /// Whether `name` is an older (or newer) version of one of our generations.
  pub fn is_stale(&self, name: &str) -> bool {
    match GenerationName::parse_tracked(name, self.namespace(), &self.tracked_suffixes()) {
      Some(parsed) => parsed.version != self.version(),
      None => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn generations(version: &str) -> Generations {
    Generations::new(&CacheConfig {
      version: version.to_string(),
      ..CacheConfig::default()
    })
  }

  #[test]
  fn test_current_names() {
    assert_eq!(
      generations("v1.1").current_names(),
      vec![
        "hopeignites-static-v1.1",
        "hopeignites-images-v1.1",
        "hopeignites-data-v1.1",
        "hopeignites-app-launcher-v1.1",
      ]
    );
  }

  #[test]
  fn test_staleness() {
    let gens = generations("v2");
    assert!(gens.is_stale("hopeignites-static-v1"));
    assert!(gens.is_stale("hopeignites-app-launcher-v1.1"));
    assert!(!gens.is_stale("hopeignites-data-v2"));
    assert!(!gens.is_stale("someone-else-static-v1"));
    assert!(!gens.is_stale("hopeignites-fonts-v1"));
  }
}
