//! On-disk TOML configuration.
//!
//! All fields are optional so partial configs work: a config found in the
//! working directory (`.citefetch.toml`) is overlaid on the platform config
//! (`<config_dir>/citefetch/config.toml`), and whatever is still unset
//! falls back to built-in defaults at the call site.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub fetch: Option<FetchConfig>,
    pub scholar: Option<ScholarConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Cache entry time-to-live in seconds.
    pub ttl_secs: Option<u64>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Response-body size bound in bytes.
    pub max_body_bytes: Option<usize>,
    /// Override for the browser-like User-Agent header.
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScholarConfig {
    /// Base URL used for synthesized search queries.
    pub base_url: Option<String>,
}

/// Platform config path: `<config_dir>/citefetch/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citefetch").join("config.toml"))
}

/// Load config by cascading CWD `.citefetch.toml` over the platform config.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".citefetch.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        fetch: Some(FetchConfig {
            ttl_secs: overlay
                .fetch
                .as_ref()
                .and_then(|f| f.ttl_secs)
                .or_else(|| base.fetch.as_ref().and_then(|f| f.ttl_secs)),
            timeout_secs: overlay
                .fetch
                .as_ref()
                .and_then(|f| f.timeout_secs)
                .or_else(|| base.fetch.as_ref().and_then(|f| f.timeout_secs)),
            max_body_bytes: overlay
                .fetch
                .as_ref()
                .and_then(|f| f.max_body_bytes)
                .or_else(|| base.fetch.as_ref().and_then(|f| f.max_body_bytes)),
            user_agent: overlay
                .fetch
                .as_ref()
                .and_then(|f| f.user_agent.clone())
                .or_else(|| base.fetch.as_ref().and_then(|f| f.user_agent.clone())),
        }),
        scholar: Some(ScholarConfig {
            base_url: overlay
                .scholar
                .as_ref()
                .and_then(|s| s.base_url.clone())
                .or_else(|| base.scholar.as_ref().and_then(|s| s.base_url.clone())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml = r#"
            [fetch]
            ttl_secs = 1800
            timeout_secs = 5
            max_body_bytes = 500000
            user_agent = "Mozilla/5.0 test"

            [scholar]
            base_url = "https://scholar.google.de"
        "#;
        let config: ConfigFile = toml::from_str(toml).unwrap();
        let fetch = config.fetch.unwrap();
        assert_eq!(fetch.ttl_secs, Some(1800));
        assert_eq!(fetch.timeout_secs, Some(5));
        assert_eq!(fetch.max_body_bytes, Some(500_000));
        assert_eq!(fetch.user_agent.as_deref(), Some("Mozilla/5.0 test"));
        assert_eq!(
            config.scholar.unwrap().base_url.as_deref(),
            Some("https://scholar.google.de")
        );
    }

    #[test]
    fn partial_config_leaves_rest_unset() {
        let config: ConfigFile = toml::from_str("[fetch]\nttl_secs = 60\n").unwrap();
        let fetch = config.fetch.unwrap();
        assert_eq!(fetch.ttl_secs, Some(60));
        assert!(fetch.timeout_secs.is_none());
        assert!(config.scholar.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base: ConfigFile =
            toml::from_str("[fetch]\nttl_secs = 3600\ntimeout_secs = 10\n").unwrap();
        let overlay: ConfigFile = toml::from_str("[fetch]\nttl_secs = 60\n").unwrap();

        let merged = merge(base, overlay);
        let fetch = merged.fetch.unwrap();
        assert_eq!(fetch.ttl_secs, Some(60));
        // Unset in the overlay: base value survives.
        assert_eq!(fetch.timeout_secs, Some(10));
    }

    #[test]
    fn merge_fills_missing_sections() {
        let base: ConfigFile =
            toml::from_str("[scholar]\nbase_url = \"https://scholar.google.com\"\n").unwrap();
        let overlay = ConfigFile::default();

        let merged = merge(base, overlay);
        assert_eq!(
            merged.scholar.unwrap().base_url.as_deref(),
            Some("https://scholar.google.com")
        );
    }

    #[test]
    fn missing_file_is_none() {
        assert!(load_from_path(&PathBuf::from("/nonexistent/citefetch.toml")).is_none());
    }

    #[test]
    fn unparseable_file_content_is_none() {
        let parsed: Result<ConfigFile, _> = toml::from_str("not [ valid toml");
        assert!(parsed.is_err());
    }
}
