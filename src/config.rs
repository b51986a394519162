use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Origin the launcher page is served from
  pub origin: Url,
  pub cache: CacheConfig,
  pub assets: AssetsConfig,
  pub session: SessionConfig,
  pub release: ReleaseConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      origin: Url::parse("http://localhost:8080/").expect("static origin is valid"),
      cache: CacheConfig::default(),
      assets: AssetsConfig::default(),
      session: SessionConfig::default(),
      release: ReleaseConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Prefix shared by every generation name
  pub namespace: String,
  /// Version tag; bump it to make the next install purge older generations
  pub version: String,
  /// Suffix of the catch-all generation
  pub catch_all: String,
  /// Give up on network-first fetches after this many seconds (unset: wait forever)
  pub network_timeout_secs: Option<u64>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      namespace: "hopeignites".to_string(),
      version: "v1.1".to_string(),
      catch_all: "app-launcher".to_string(),
      network_timeout_secs: None,
    }
  }
}

impl CacheConfig {
  pub fn network_timeout(&self) -> Option<Duration> {
    self.network_timeout_secs.map(Duration::from_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
  /// App shell, cached on install and served cache-first
  #[serde(rename = "static")]
  pub static_assets: Vec<String>,
  /// Any path under this prefix is an image
  pub image_prefix: String,
  /// Images cached on install
  pub images: Vec<String>,
  /// Data files, served network-first
  pub data: Vec<String>,
  /// Served from the static generation when a shell asset is unreachable
  pub fallback_document: String,
}

impl Default for AssetsConfig {
  fn default() -> Self {
    Self {
      static_assets: ["/", "/index.html", "/styles.css", "/scripts.js", "/manifest.json"]
        .map(String::from)
        .to_vec(),
      image_prefix: "/assets/".to_string(),
      images: [
        "/assets/light-logo.png",
        "/assets/dark-logo.png",
        "/assets/universal.png",
        "/assets/sso-badge.png",
        "/assets/hq-badge.png",
      ]
      .map(String::from)
      .to_vec(),
      data: vec!["/portal-data.json".to_string()],
      fallback_document: "/index.html".to_string(),
    }
  }
}

/// Inclusive IPv4 range.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct IpRange {
  pub start: Ipv4Addr,
  pub end: Ipv4Addr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Addresses treated as the privileged (NHQ) network
  pub allowed_ips: Vec<Ipv4Addr>,
  pub allowed_ranges: Vec<IpRange>,
  /// Services answering `{"ip": "..."}`, tried in order
  pub ip_services: Vec<String>,
  /// How long a resolved IP is reused before asking again (0 disables reuse)
  pub ip_cache_minutes: u32,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      allowed_ips: Vec::new(),
      allowed_ranges: Vec::new(),
      ip_services: vec![
        "https://api.ipify.org?format=json".to_string(),
        "https://api64.ipify.org?format=json".to_string(),
      ],
      ip_cache_minutes: 60,
    }
  }
}

/// Repository whose latest commit identifies the deployed launcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
  pub api_base: String,
  pub owner: String,
  pub repo: String,
  pub branch: String,
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      api_base: "https://api.github.com".to_string(),
      owner: "hope-ignites".to_string(),
      repo: "my-hopeignites-app".to_string(),
      branch: "main".to_string(),
    }
  }
}

/// Upper bound for `session.ip_cache_minutes`: one week.
const MAX_IP_CACHE_MINUTES: u32 = 7 * 24 * 60;

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./portal-cache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/portal-cache/config.yaml
  ///
  /// Without any file the built-in defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => {
        tracing::info!("no configuration file found, using defaults");
        Ok(Self::default())
      }
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("portal-cache.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("portal-cache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    if self.cache.namespace.is_empty() || self.cache.version.is_empty() {
      return Err(eyre!("cache.namespace and cache.version must not be empty"));
    }
    if !self.assets.image_prefix.starts_with('/') {
      return Err(eyre!(
        "assets.image_prefix must be root-relative, got '{}'",
        self.assets.image_prefix
      ));
    }
    let suffixes = ["static", "images", "data"];
    if suffixes.contains(&self.cache.catch_all.as_str()) {
      return Err(eyre!(
        "cache.catch_all '{}' collides with a class generation",
        self.cache.catch_all
      ));
    }
    if self.session.ip_cache_minutes > MAX_IP_CACHE_MINUTES {
      return Err(eyre!(
        "session.ip_cache_minutes must be at most {}, got {}",
        MAX_IP_CACHE_MINUTES,
        self.session.ip_cache_minutes
      ));
    }
    Ok(())
  }
}

/// Directory holding the cache and preference databases.
pub fn data_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("portal-cache"))
}
