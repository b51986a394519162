/// Schema for user preference tables.
pub const SCHEMA: &str = r#"
-- Favorited card URLs, in the order they were added
CREATE TABLE IF NOT EXISTS favorites (
    url TEXT PRIMARY KEY,
    added_at TEXT NOT NULL DEFAULT (datetime('now')),
    position INTEGER NOT NULL
);

-- Small key/value settings (dark mode, cached client IP)
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Preference key holding `enabled` / `disabled`.
pub const DARK_MODE_KEY: &str = "darkMode";

/// Preference key holding the cached client IP as JSON.
pub const IP_CACHE_KEY: &str = "user_ip_data";
