use serde::{Deserialize, Serialize};

/// Decoded data asset: categories of launcher cards, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
  pub categories: Vec<Category>,
  /// Shortcut links shown above the tabs
  #[serde(default)]
  pub quick_links: Vec<QuickLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickLink {
  pub url: String,
  pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub cards: Vec<Card>,
}

/// One application link. The URL is its identity (favorites are keyed by it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub url: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub icon: Option<Icon>,
  /// Available to all team members
  #[serde(default)]
  pub universal: bool,
  /// Only shown on the privileged network
  #[serde(default)]
  pub nhq_only: bool,
  /// Single sign-on enabled
  #[serde(default)]
  pub sso: bool,
  /// Technician tooling
  #[serde(default)]
  pub tech: bool,
}

/// Either one icon for both themes or a light/dark pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Icon {
  Plain(String),
  Themed {
    #[serde(default)]
    light: Option<String>,
    #[serde(default)]
    dark: Option<String>,
  },
}

/// Pseudo-category ids that never hold cards of their own.
pub const ALL_CATEGORY: &str = "all";
pub const FAVORITES_CATEGORY: &str = "favorites";
/// Hidden outside tech mode.
pub const TECH_CATEGORY: &str = "tech-tools";

impl Category {
  /// Real categories hold cards; `all` and `favorites` are views.
  pub fn is_view(&self) -> bool {
    self.id == ALL_CATEGORY || self.id == FAVORITES_CATEGORY
  }

  pub fn is_tech(&self) -> bool {
    self.id == TECH_CATEGORY
  }
}
