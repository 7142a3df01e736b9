use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// SeoConfig: env-first settings with an optional seo-mcp.json file fallback
// ---------------------------------------------------------------------------

pub const ENV_CAPSOLVER_API_KEY: &str = "CAPSOLVER_API_KEY";
pub const ENV_CAPSOLVER_BASE_URL: &str = "CAPSOLVER_BASE_URL";
pub const ENV_CAPSOLVER_POLL_INTERVAL_MS: &str = "CAPSOLVER_POLL_INTERVAL_MS";
pub const ENV_CAPSOLVER_MAX_POLLS: &str = "CAPSOLVER_MAX_POLLS";
pub const ENV_CAPSOLVER_TIMEOUT_SECS: &str = "CAPSOLVER_TIMEOUT_SECS";
pub const ENV_AHREFS_BASE_URL: &str = "AHREFS_BASE_URL";
pub const ENV_CACHE_DIR: &str = "SEO_MCP_CACHE_DIR";
pub const ENV_SIGNATURE_CACHE: &str = "SEO_MCP_SIGNATURE_CACHE";
pub const ENV_CONFIG_PATH: &str = "SEO_MCP_CONFIG";

pub const DEFAULT_CAPSOLVER_BASE_URL: &str = "https://api.capsolver.com";
pub const DEFAULT_AHREFS_BASE_URL: &str = "https://ahrefs.com";

/// Turnstile site key Ahrefs uses on its free tools.
pub const AHREFS_TURNSTILE_SITE_KEY: &str = "0x4AAAAAAAAzi9ITzSN9xKMi";

/// Shape of `seo-mcp.json`. Every field is optional; env vars win.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct SeoConfigFile {
    /// Never logged.
    pub capsolver_api_key: Option<String>,
    pub capsolver_base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub max_polls: Option<u32>,
    pub solve_timeout_secs: Option<u64>,
    pub ahrefs_base_url: Option<String>,
    pub cache_dir: Option<String>,
    pub signature_cache: Option<bool>,
}

/// Resolved runtime settings for the solver, the upstream site and the cache.
#[derive(Clone)]
pub struct SeoConfig {
    pub capsolver_api_key: Option<String>,
    pub capsolver_base_url: String,
    pub website_key: String,
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub solve_timeout: Duration,
    pub ahrefs_base_url: String,
    /// `None` disables the on-disk signature cache.
    pub cache_dir: Option<PathBuf>,
}

impl std::fmt::Debug for SeoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeoConfig")
            .field("capsolver_api_key_set", &self.capsolver_api_key.is_some())
            .field("capsolver_base_url", &self.capsolver_base_url)
            .field("poll_interval", &self.poll_interval)
            .field("max_polls", &self.max_polls)
            .field("solve_timeout", &self.solve_timeout)
            .field("ahrefs_base_url", &self.ahrefs_base_url)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            capsolver_api_key: None,
            capsolver_base_url: DEFAULT_CAPSOLVER_BASE_URL.to_string(),
            website_key: AHREFS_TURNSTILE_SITE_KEY.to_string(),
            poll_interval: Duration::from_secs(2),
            max_polls: 60,
            solve_timeout: Duration::from_secs(120),
            ahrefs_base_url: DEFAULT_AHREFS_BASE_URL.to_string(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl SeoConfig {
    /// Env vars → `seo-mcp.json` → built-in defaults.
    pub fn from_env() -> Self {
        Self::resolve(&load_config_file(), |k| std::env::var(k).ok())
    }

    /// Resolution with an injectable env lookup so tests never touch the process env.
    pub fn resolve<F>(file: &SeoConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |k: &str| env(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let capsolver_api_key = env(ENV_CAPSOLVER_API_KEY).or_else(|| {
            file.capsolver_api_key
                .as_ref()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        });

        let capsolver_base_url = env(ENV_CAPSOLVER_BASE_URL)
            .or_else(|| file.capsolver_base_url.clone())
            .and_then(|u| base_url(ENV_CAPSOLVER_BASE_URL, &u))
            .unwrap_or(defaults.capsolver_base_url);

        let poll_interval = env(ENV_CAPSOLVER_POLL_INTERVAL_MS)
            .and_then(|v| v.parse::<u64>().ok())
            .or(file.poll_interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let max_polls = env(ENV_CAPSOLVER_MAX_POLLS)
            .and_then(|v| v.parse::<u32>().ok())
            .or(file.max_polls)
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_polls);

        let solve_timeout = env(ENV_CAPSOLVER_TIMEOUT_SECS)
            .and_then(|v| v.parse::<u64>().ok())
            .or(file.solve_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.solve_timeout);

        let ahrefs_base_url = env(ENV_AHREFS_BASE_URL)
            .or_else(|| file.ahrefs_base_url.clone())
            .and_then(|u| base_url(ENV_AHREFS_BASE_URL, &u))
            .unwrap_or(defaults.ahrefs_base_url);

        let cache_enabled = match env(ENV_SIGNATURE_CACHE) {
            Some(v) => !matches!(
                v.to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off" | "disabled"
            ),
            None => file.signature_cache.unwrap_or(true),
        };
        let cache_dir = if cache_enabled {
            env(ENV_CACHE_DIR)
                .or_else(|| file.cache_dir.clone())
                .map(PathBuf::from)
                .or(defaults.cache_dir)
        } else {
            None
        };

        Self {
            capsolver_api_key,
            capsolver_base_url,
            website_key: defaults.website_key,
            poll_interval,
            max_polls,
            solve_timeout,
            ahrefs_base_url,
            cache_dir,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.capsolver_api_key = Some(key.into());
        self
    }
}

/// Absolute http(s) URL without a trailing slash; anything else is ignored.
fn base_url(key: &str, raw: &str) -> Option<String> {
    match url::Url::parse(raw.trim()) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => {
            Some(raw.trim().trim_end_matches('/').to_string())
        }
        _ => {
            tracing::warn!("{}: ignoring invalid base URL {:?}", key, raw);
            None
        }
    }
}

/// `~/.seo-mcp`, or `None` when the home directory is unknown.
fn default_cache_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".seo-mcp"))
}

/// Load `seo-mcp.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `SEO_MCP_CONFIG` env var path
/// 2. `./seo-mcp.json`
/// 3. `../seo-mcp.json`
///
/// Missing file → defaults. Parse error → warning, defaults.
pub fn load_config_file() -> SeoConfigFile {
    let mut candidates = vec![
        PathBuf::from("seo-mcp.json"),
        PathBuf::from("../seo-mcp.json"),
    ];
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        candidates.insert(0, PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return match serde_json::from_str::<SeoConfigFile>(&contents) {
            Ok(cfg) => {
                tracing::info!("seo-mcp.json loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    "seo-mcp.json parse error at {}: {}; using defaults",
                    path.display(),
                    e
                );
                SeoConfigFile::default()
            }
        };
    }

    SeoConfigFile::default()
}

/// `--port` / `--port=N` argument, then `SEO_MCP_PORT`, then `PORT`.
pub fn port_from_args_or_env() -> Option<u16> {
    let mut args = std::env::args();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(p) = args.next().and_then(|v| v.parse::<u16>().ok()) {
                return Some(p);
            }
        } else if let Some(p) = a.strip_prefix("--port=").and_then(|v| v.parse::<u16>().ok()) {
            return Some(p);
        }
    }
    ["SEO_MCP_PORT", "PORT"]
        .iter()
        .find_map(|k| std::env::var(k).ok().and_then(|v| v.trim().parse::<u16>().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let file = SeoConfigFile {
            capsolver_api_key: Some("from-file".into()),
            poll_interval_ms: Some(500),
            ..Default::default()
        };
        let cfg = SeoConfig::resolve(
            &file,
            env_of(&[
                (ENV_CAPSOLVER_API_KEY, "from-env"),
                (ENV_CAPSOLVER_POLL_INTERVAL_MS, "250"),
            ]),
        );
        assert_eq!(cfg.capsolver_api_key.as_deref(), Some("from-env"));
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = SeoConfig::resolve(
            &SeoConfigFile::default(),
            env_of(&[(ENV_CAPSOLVER_API_KEY, "   ")]),
        );
        assert!(cfg.capsolver_api_key.is_none());
    }

    #[test]
    fn defaults_match_capsolver_and_ahrefs() {
        let cfg = SeoConfig::resolve(&SeoConfigFile::default(), env_of(&[]));
        assert_eq!(cfg.capsolver_base_url, DEFAULT_CAPSOLVER_BASE_URL);
        assert_eq!(cfg.ahrefs_base_url, DEFAULT_AHREFS_BASE_URL);
        assert_eq!(cfg.poll_interval, Duration::from_secs(2));
        assert_eq!(cfg.website_key, AHREFS_TURNSTILE_SITE_KEY);
    }

    #[test]
    fn signature_cache_can_be_disabled() {
        let cfg = SeoConfig::resolve(
            &SeoConfigFile::default(),
            env_of(&[(ENV_SIGNATURE_CACHE, "off"), (ENV_CACHE_DIR, "/tmp/x")]),
        );
        assert!(cfg.cache_dir.is_none());
    }

    #[test]
    fn base_urls_lose_trailing_slash() {
        let cfg = SeoConfig::resolve(
            &SeoConfigFile::default(),
            env_of(&[(ENV_AHREFS_BASE_URL, "http://127.0.0.1:9999/")]),
        );
        assert_eq!(cfg.ahrefs_base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn invalid_base_urls_fall_back_to_defaults() {
        let file = SeoConfigFile {
            capsolver_base_url: Some("api.capsolver.com".into()),
            ..Default::default()
        };
        let cfg = SeoConfig::resolve(&file, env_of(&[(ENV_AHREFS_BASE_URL, "ftp://ahrefs.com")]));
        assert_eq!(cfg.capsolver_base_url, DEFAULT_CAPSOLVER_BASE_URL);
        assert_eq!(cfg.ahrefs_base_url, DEFAULT_AHREFS_BASE_URL);
    }
}
