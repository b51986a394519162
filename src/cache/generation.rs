//! Versioned generation names: `<namespace>-<suffix>-<version>`.

use std::fmt;

/// Name of one versioned cache partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationName {
  pub namespace: String,
  pub suffix: String,
  pub version: String,
}

impl GenerationName {
  pub fn new(namespace: &str, suffix: &str, version: &str) -> Self {
    Self {
      namespace: namespace.to_string(),
      suffix: suffix.to_string(),
      version: version.to_string(),
    }
  }

  /// Parse `name` as a generation of `namespace` with one of the tracked suffixes.
  ///
  /// Returns `None` for foreign names. Suffixes are tried longest first so that
  /// `app-launcher` is not mistaken for a hypothetical `app` suffix.
  pub fn parse_tracked(name: &str, namespace: &str, suffixes: &[&str]) -> Option<Self> {
    let rest = name.strip_prefix(namespace)?.strip_prefix('-')?;

    let mut ordered: Vec<&str> = suffixes.to_vec();
    ordered.sort_by_key(|s| std::cmp::Reverse(s.len()));

    ordered.into_iter().find_map(|suffix| {
      let version = rest.strip_prefix(suffix)?.strip_prefix('-')?;
      if version.is_empty() {
        return None;
      }
      Some(Self::new(namespace, suffix, version))
    })
  }
}

impl fmt::Display for GenerationName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}-{}", self.namespace, self.suffix, self.version)
  }
}
