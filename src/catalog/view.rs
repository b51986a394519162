//! Read-only queries the rendering layer runs against a loaded catalog.

use std::cmp::Ordering;

use tracing::warn;

use crate::session::SessionContext;

use super::types::{Card, Catalog, Category, Icon, QuickLink, ALL_CATEGORY, FAVORITES_CATEGORY};

/// Directory app icons with image filenames are served from.
pub const ICON_BASE_PATH: &str = "assets/app-icons/";

/// Shown when a card has no usable icon.
pub const DEFAULT_ICON: &str = "📦";

/// Which set of cards to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
  All,
  Favorites,
  Category(String),
}

impl From<&str> for Selection {
  fn from(id: &str) -> Self {
    match id {
      ALL_CATEGORY => Self::All,
      FAVORITES_CATEGORY => Self::Favorites,
      other => Self::Category(other.to_string()),
    }
  }
}

/// A search match with the name of the category it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit<'a> {
  pub card: &'a Card,
  pub category: &'a str,
}

/// A catalog seen through one session and one set of favorites.
pub struct CatalogView<'a> {
  catalog: &'a Catalog,
  session: &'a SessionContext,
  favorites: &'a [String],
}

impl<'a> CatalogView<'a> {
  pub fn new(catalog: &'a Catalog, session: &'a SessionContext, favorites: &'a [String]) -> Self {
    Self {
      catalog,
      session,
      favorites,
    }
  }

  /// Categories to show as tabs, in order.
  ///
  /// In tech mode `tech-tools` sits right after `favorites`; outside tech mode
  /// it is hidden whenever it holds tech cards.
  pub fn tabs(&self) -> Vec<&'a Category> {
    let mut tabs: Vec<&Category> = self.catalog.categories.iter().collect();

    if self.session.tech_mode {
      let tech = tabs.iter().position(|c| c.is_tech());
      let favorites = tabs.iter().position(|c| c.id == FAVORITES_CATEGORY);
      if let (Some(tech), Some(favorites)) = (tech, favorites) {
        let category = tabs.remove(tech);
        let favorites = if tech < favorites { favorites - 1 } else { favorites };
        tabs.insert(favorites + 1, category);
      }
      return tabs;
    }

    tabs
      .into_iter()
      .filter(|c| !(c.is_tech() && c.cards.iter().any(|card| card.tech)))
      .collect()
  }

  /// Cards for a selection, filtered for this session.
  ///
  /// Cards whose URL is unsafe to open are dropped.
  pub fn cards(&self, selection: &Selection) -> Vec<&'a Card> {
    let mut cards: Vec<&Card> = match selection {
      Selection::Favorites => self
        .visible_cards()
        .filter(|card| self.favorites.iter().any(|url| *url == card.url))
        .collect(),
      Selection::All => {
        let mut cards: Vec<&Card> = self.visible_cards().collect();
        cards.sort_by(|a, b| compare_titles(&a.title, &b.title));
        cards
      }
      Selection::Category(id) => self
        .catalog
        .category(id)
        .map(|category| {
          category
            .cards
            .iter()
            .filter(|card| self.allowed(card))
            .collect()
        })
        .unwrap_or_default(),
    };

    cards.retain(|card| {
      let safe = is_safe_url(&card.url);
      if !safe {
        warn!(title = %card.title, url = %card.url, "skipping card with unsafe URL");
      }
      safe
    });
    cards
  }

  /// Quick links in catalog order, minus any with an unsafe URL.
  pub fn quick_links(&self) -> Vec<&'a QuickLink> {
    self
      .catalog
      .quick_links
      .iter()
      .filter(|link| {
        let safe = is_safe_url(&link.url);
        if !safe {
          warn!(title = %link.title, url = %link.url, "skipping quick link with unsafe URL");
        }
        safe
      })
      .collect()
  }

  pub fn is_favorite(&self, card: &Card) -> bool {
    self.favorites.iter().any(|url| *url == card.url)
  }

  /// Cards from real categories that this session may see.
  fn visible_cards(&self) -> impl Iterator<Item = &'a Card> + '_ {
    self
      .catalog
      .categories
      .iter()
      .filter(|c| !c.is_view())
      .filter(|c| self.session.tech_mode || !c.is_tech())
      .flat_map(|c| c.cards.iter())
      .filter(|card| self.allowed(card))
  }

  fn allowed(&self, card: &Card) -> bool {
    !card.nhq_only || self.session.privileged_network
  }

  /// Case-insensitive search over title, description and category name.
  ///
  /// Titles starting with the query rank first; otherwise catalog order is
  /// kept. A blank query matches nothing.
  pub fn search(&self, query: &str) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
      return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a>> = self
      .catalog
      .cards()
      .filter(|(category, card)| {
        card.title.to_lowercase().contains(&query)
          || card.description.to_lowercase().contains(&query)
          || category.name.to_lowercase().contains(&query)
      })
      .map(|(category, card)| SearchHit {
        card,
        category: &category.name,
      })
      .collect();

    // Stable sort keeps catalog order within each group
    hits.sort_by_key(|hit| !hit.card.title.to_lowercase().starts_with(&query));
    hits
  }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| a.cmp(b))
}

/// Icon to show for the current theme.
pub fn icon_for_theme(icon: Option<&Icon>, dark_mode: bool) -> &str {
  match icon {
    Some(Icon::Plain(name)) => name,
    Some(Icon::Themed { light, dark }) => {
      if dark_mode {
        if let Some(dark) = dark {
          return dark;
        }
      }
      light
        .as_deref()
        .or(dark.as_deref())
        .unwrap_or(DEFAULT_ICON)
    }
    None => DEFAULT_ICON,
  }
}

/// Path an icon resolves to: image files live under the icon directory,
/// anything else (an emoji) is shown as-is.
pub fn icon_path(icon: &str) -> String {
  if icon.contains(".png") {
    format!("{ICON_BASE_PATH}{icon}")
  } else {
    icon.to_string()
  }
}

/// Whether a card URL is safe to open.
///
/// Only `http://`, `https://` and root-relative links pass.
pub fn is_safe_url(url: &str) -> bool {
  const DANGEROUS: [&str; 4] = ["javascript:", "data:", "vbscript:", "file:"];

  let url = url.trim().to_lowercase();
  if url.is_empty() || DANGEROUS.iter().any(|p| url.starts_with(p)) {
    return false;
  }
  url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/')
}
