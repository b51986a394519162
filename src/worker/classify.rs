//! Request classification.

use std::fmt;

use crate::net::Request;

use super::manifest::AssetManifest;

/// Bucket deciding which caching strategy applies to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
  /// App shell: path is exactly one of the static assets
  Static,
  /// Path under the image prefix
  Image,
  /// Path is exactly one of the data files
  Data,
  /// Different origin than the page
  CrossOrigin,
  /// Anything else on the page's origin
  Other,
}

impl ResourceClass {
  /// Classes populated eagerly on install.
  pub const INSTALLED: [ResourceClass; 3] = [Self::Static, Self::Image, Self::Data];

  /// Fixed generation suffix; the catch-all suffix comes from configuration.
  pub fn suffix(self) -> Option<&'static str> {
    match self {
      Self::Static => Some("static"),
      Self::Image => Some("images"),
      Self::Data => Some("data"),
      Self::CrossOrigin | Self::Other => None,
    }
  }
}

impl fmt::Display for ResourceClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Self::Static => "static",
      Self::Image => "image",
      Self::Data => "data",
      Self::CrossOrigin => "cross-origin",
      Self::Other => "other",
    };
    f.write_str(label)
  }
}

impl AssetManifest {
  /// Classify a request.
  ///
  /// Origin is checked first so that a third-party URL whose path happens to
  /// be `/` never lands in the static generation. Same-origin requests are
  /// then matched static, image, data in that order.
  pub fn classify(&self, request: &Request) -> ResourceClass {
    if request.url.origin() != self.origin.origin() {
      return ResourceClass::CrossOrigin;
    }

    let path = request.url.path();
    if self.static_assets.iter().any(|asset| asset == path) {
      ResourceClass::Static
    } else if path.starts_with(&self.image_prefix) {
      ResourceClass::Image
    } else if self.data.iter().any(|asset| asset == path) {
      ResourceClass::Data
    } else {
      ResourceClass::Other
    }
  }
}
