mod cache;
mod catalog;
mod config;
mod db;
mod error;
mod net;
mod session;
mod version;
mod worker;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use reqwest::Method;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::cache::{CacheStorage, SqliteStorage};
use crate::catalog::{icon_for_theme, icon_path, CatalogView, Selection};
use crate::db::Database;
use crate::net::{HttpNetwork, Request};
use crate::session::{is_tech_path, SessionContext};
use crate::worker::CacheController;

type Controller = CacheController<SqliteStorage, HttpNetwork>;

#[derive(Parser, Debug)]
#[command(name = "portal-cache")]
#[command(about = "Offline cache controller and catalog store for the application launcher")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/portal-cache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Origin the launcher is served from
  #[arg(short, long)]
  origin: Option<Url>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Install the configured version and purge older generations
  Install,
  /// Fetch a path or URL through the cache controller
  Fetch {
    /// Path relative to the origin, or an absolute URL
    target: String,
    #[arg(short, long, default_value = "GET")]
    method: String,
    /// Write the body here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
  },
  /// List cache generations and their entry counts
  Generations,
  /// Show the launcher cards for this session
  Apps {
    /// Category id, `all` or `favorites`
    #[arg(long, default_value = "all")]
    category: String,
    /// Search titles, descriptions and category names instead
    #[arg(long)]
    search: Option<String>,
    /// Force tech mode on
    #[arg(long)]
    tech: bool,
    /// Page path; anything under /tech turns tech mode on
    #[arg(long, default_value = "/")]
    path: String,
  },
  /// Add or remove a favorite by card URL
  Favorite { url: String },
  /// Show or change the dark mode preference
  DarkMode { state: Option<Toggle> },
  /// Show the resolved session context
  Session {
    #[arg(long)]
    tech: bool,
  },
  /// Show the latest commit of the deployed launcher
  Version,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
  On,
  Off,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _guard = init_tracing()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override origin if specified on command line
  let config = if let Some(origin) = args.origin {
    config::Config { origin, ..config }
  } else {
    config
  };

  match args.command {
    Command::Install => {
      let mut controller = controller(&config)?;
      controller.install().await?;
      let purged = controller.activate().await?;
      println!("state    {}", controller.state());
      for name in controller.generations().current_names() {
        println!("current  {name}");
      }
      for name in purged {
        println!("purged   {name}");
      }
    }
    Command::Fetch {
      target,
      method,
      output,
    } => {
      let controller = active_controller(&config).await?;
      let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|e| eyre!("Invalid method '{}': {}", method, e))?;
      let request = Request::new(method, config.origin.join(&target)?);

      let served = controller.handle(&request).await?;
      let stored = served
        .cached_at
        .map(|at| format!(", stored {}", at.format("%Y-%m-%d %H:%M:%S")))
        .unwrap_or_default();
      eprintln!(
        "{} {} ({}{}, {} bytes, {})",
        served.data.status,
        served.data.url,
        served.source,
        stored,
        served.data.body.len(),
        served.data.header("content-type").unwrap_or("unknown type")
      );
      write_body(&served.data.body, output.as_deref())?;
    }
    Command::Generations => {
      let controller = controller(&config)?;
      let generations = controller.generations();
      let current = generations.current_names();
      for name in controller.storage().generation_names()? {
        let state = if current.contains(&name) {
          "current"
        } else if generations.is_stale(&name) {
          "stale"
        } else {
          "foreign"
        };
        let entries = controller.storage().entry_count(&name)?;
        println!("{state:<8} {entries:>4}  {name}");
      }
    }
    Command::Apps {
      category,
      search,
      tech,
      path,
    } => {
      let controller = active_controller(&config).await?;
      let db = Database::open()?;
      let catalog = catalog::load(&controller).await?;
      let tech_mode = tech || is_tech_path(&path);
      let session = SessionContext::resolve(&controller, &db, &config.session, tech_mode).await;
      let favorites = db.favorites()?;
      let dark_mode = db.dark_mode()?;
      let view = CatalogView::new(&catalog, &session, &favorites);

      if let Some(query) = search {
        for hit in view.search(&query) {
          println!("{:<30} {:<20} {}", hit.card.title, hit.category, hit.card.url);
        }
        return Ok(());
      }

      let links: Vec<String> = view
        .quick_links()
        .iter()
        .map(|link| format!("{} <{}>", link.title, link.url))
        .collect();
      if !links.is_empty() {
        println!("{}", links.join("  "));
      }

      let tabs: Vec<&str> = view.tabs().iter().map(|c| c.name.as_str()).collect();
      println!("[{}]", tabs.join(" | "));
      for card in view.cards(&Selection::from(category.as_str())) {
        let star = if view.is_favorite(card) { "*" } else { " " };
        let icon = icon_path(icon_for_theme(card.icon.as_ref(), dark_mode));
        println!("{star} {:<30} {:<40} {icon}", card.title, card.url);
      }
    }
    Command::Favorite { url } => {
      let db = Database::open()?;
      let now = db.toggle_favorite(&url)?;
      println!("{} {url}", if now { "added" } else { "removed" });
    }
    Command::DarkMode { state } => {
      let db = Database::open()?;
      if let Some(state) = state {
        db.set_dark_mode(matches!(state, Toggle::On))?;
      }
      println!("dark mode {}", if db.dark_mode()? { "on" } else { "off" });
    }
    Command::Session { tech } => {
      let controller = active_controller(&config).await?;
      let db = Database::open()?;
      let session = SessionContext::resolve(&controller, &db, &config.session, tech).await;
      match session.client_ip {
        Some(ip) => println!("ip          {ip}"),
        None => println!("ip          unknown"),
      }
      println!("privileged  {}", session.privileged_network);
      println!("tech mode   {}", session.tech_mode);
    }
    Command::Version => {
      let controller = active_controller(&config).await?;
      match version::latest_release(&controller, &config.release).await {
        Ok(release) => println!(
          "version {} ({})  {}  {}",
          release.short_sha(),
          release.date.format("%b %-d, %Y"),
          release.summary,
          release.url
        ),
        Err(e) => {
          tracing::warn!("failed to fetch commit id: {e}");
          println!("version unknown");
        }
      }
    }
  }

  Ok(())
}

fn controller(config: &config::Config) -> Result<Controller> {
  let storage = Arc::new(SqliteStorage::open()?);
  let network = Arc::new(HttpNetwork::new()?);
  Ok(CacheController::new(storage, network, config))
}

/// Controller for the configured version, installing it first if needed.
async fn active_controller(config: &config::Config) -> Result<Controller> {
  let mut controller = controller(config)?;
  if !controller.resume()? {
    controller.install().await?;
    controller.activate().await?;
  }
  Ok(controller)
}

fn write_body(body: &[u8], output: Option<&Path>) -> Result<()> {
  use std::io::Write;

  match output {
    Some(path) => std::fs::write(path, body)
      .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e)),
    None => {
      std::io::stdout().write_all(body)?;
      Ok(())
    }
  }
}

/// Log to a daily file under the data directory.
///
/// Verbosity comes from `PORTAL_CACHE_LOG` (default `portal_cache=info`).
fn init_tracing() -> Result<WorkerGuard> {
  let log_dir = config::data_dir()?.join("logs");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&log_dir, "portal-cache.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env("PORTAL_CACHE_LOG")
    .unwrap_or_else(|_| EnvFilter::new("portal_cache=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
