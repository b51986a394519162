//! Which launcher build is deployed, from the latest commit of its repository.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use tracing::debug;

use crate::cache::CacheStorage;
use crate::config::ReleaseConfig;
use crate::net::{Network, Request};
use crate::worker::CacheController;

/// Latest commit of the configured branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
  pub sha: String,
  pub date: DateTime<Utc>,
  /// First line of the commit message
  pub summary: String,
  /// Browser link to the commit
  pub url: String,
}

impl Release {
  pub fn short_sha(&self) -> &str {
    self.sha.get(..7).unwrap_or(&self.sha)
  }
}

#[derive(Deserialize)]
struct CommitResponse {
  sha: String,
  commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
  author: CommitAuthor,
  message: String,
}

#[derive(Deserialize)]
struct CommitAuthor {
  date: DateTime<Utc>,
}

fn commit_url(config: &ReleaseConfig) -> String {
  format!(
    "{}/repos/{}/{}/commits/{}",
    config.api_base.trim_end_matches('/'),
    config.owner,
    config.repo,
    config.branch
  )
}

/// Fetch the latest commit through the controller.
///
/// The API lives on another origin, so the request is never cached.
pub async fn latest_release<S, N>(
  controller: &CacheController<S, N>,
  config: &ReleaseConfig,
) -> Result<Release>
where
  S: CacheStorage,
  N: Network,
{
  let url = commit_url(config);
  let request = Request::get(
    url::Url::parse(&url).map_err(|e| eyre!("Invalid release URL '{}': {}", url, e))?,
  );

  let served = controller.handle(&request).await?;
  if !served.data.is_success() {
    return Err(eyre!(
      "Failed to fetch commit data: status {}",
      served.data.status
    ));
  }

  let commit: CommitResponse = serde_json::from_slice(&served.data.body)
    .map_err(|e| eyre!("Failed to parse commit data: {}", e))?;
  debug!(sha = %commit.sha, source = %served.source, "fetched latest commit");

  Ok(Release {
    url: format!(
      "https://github.com/{}/{}/commit/{}",
      config.owner, config.repo, commit.sha
    ),
    summary: commit
      .commit
      .message
      .lines()
      .next()
      .unwrap_or_default()
      .to_string(),
    date: commit.commit.author.date,
    sha: commit.sha,
  })
}
