//! Per-session flags computed once and passed to catalog queries.

use std::net::{IpAddr, Ipv4Addr};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::CacheStorage;
use crate::config::{IpRange, SessionConfig};
use crate::db::Database;
use crate::net::{Network, Request};
use crate::worker::CacheController;

/// Facts about the current visitor that change which cards are shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
  /// Public address as reported by the IP services, if any answered
  pub client_ip: Option<IpAddr>,
  /// Visitor is on the privileged (NHQ) network; NHQ-only cards are visible
  pub privileged_network: bool,
  /// Technician mode: tech-tools category is shown and promoted
  pub tech_mode: bool,
}

/// Addresses that count as the privileged network.
#[derive(Debug, Clone, Default)]
pub struct IpPolicy {
  allowed: Vec<Ipv4Addr>,
  ranges: Vec<IpRange>,
}

impl IpPolicy {
  pub fn new(config: &SessionConfig) -> Self {
    Self {
      allowed: config.allowed_ips.clone(),
      ranges: config.allowed_ranges.clone(),
    }
  }

  /// Exact matches first, then inclusive ranges. IPv6 is never privileged.
  pub fn contains(&self, ip: IpAddr) -> bool {
    let IpAddr::V4(ip) = ip else {
      return false;
    };
    if self.allowed.contains(&ip) {
      return true;
    }
    let value = u32::from(ip);
    self
      .ranges
      .iter()
      .any(|range| (u32::from(range.start)..=u32::from(range.end)).contains(&value))
  }
}

/// Tech mode is on for any page under `/tech`.
pub fn is_tech_path(path: &str) -> bool {
  path.contains("/tech")
}

#[derive(Deserialize)]
struct IpResponse {
  ip: String,
}

impl SessionContext {
  pub fn new(client_ip: Option<IpAddr>, policy: &IpPolicy, tech_mode: bool) -> Self {
    Self {
      client_ip,
      privileged_network: client_ip.is_some_and(|ip| policy.contains(ip)),
      tech_mode,
    }
  }

  /// Work out the session once at startup.
  ///
  /// A failed lookup is not an error; the session is simply unprivileged.
  pub async fn resolve<S, N>(
    controller: &CacheController<S, N>,
    db: &Database,
    config: &SessionConfig,
    tech_mode: bool,
  ) -> Self
  where
    S: CacheStorage,
    N: Network,
  {
    let max_age = chrono::Duration::minutes(i64::from(config.ip_cache_minutes));
    let cached = match db.cached_ip(max_age) {
      Ok(ip) => ip,
      Err(e) => {
        warn!("ignoring unreadable IP cache: {e}");
        None
      }
    };

    let client_ip = match cached {
      Some(ip) => {
        debug!(%ip, "using cached IP");
        Some(ip)
      }
      None => {
        let fresh = lookup_ip(controller, &config.ip_services).await;
        if let Some(ip) = fresh {
          if let Err(e) = db.store_ip(ip) {
            warn!("failed to cache IP: {e}");
          }
        }
        fresh
      }
    };

    let session = Self::new(client_ip, &IpPolicy::new(config), tech_mode);
    if session.privileged_network {
      info!("privileged network detected");
    }
    session
  }
}

/// Ask each service in turn; the first usable answer wins.
async fn lookup_ip<S, N>(controller: &CacheController<S, N>, services: &[String]) -> Option<IpAddr>
where
  S: CacheStorage,
  N: Network,
{
  for service in services {
    let request = match url::Url::parse(service) {
      Ok(url) => Request::get(url),
      Err(e) => {
        warn!(%service, "invalid IP service URL: {e}");
        continue;
      }
    };

    let body = match controller.handle(&request).await {
      Ok(served) if served.data.is_success() => served.data.body,
      Ok(served) => {
        warn!(%service, status = served.data.status, "IP service answered with error");
        continue;
      }
      Err(e) => {
        warn!(%service, "IP service unreachable: {e}");
        continue;
      }
    };

    match serde_json::from_slice::<IpResponse>(&body)
      .ok()
      .and_then(|r| r.ip.parse::<IpAddr>().ok())
    {
      Some(ip) => {
        debug!(%ip, %service, "fetched client IP");
        return Some(ip);
      }
      None => warn!(%service, "IP service returned an unusable body"),
    }
  }

  warn!("all IP services failed");
  None
}
