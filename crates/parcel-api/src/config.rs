//! Server configuration read from the environment.
//!
//! Environment variables:
//!   HOST                   - bind address (default: 0.0.0.0)
//!   PORT                   - bind port (default: 8000)
//!   MEDIA_ROOT             - directory uploaded files are written under (default: ./media)
//!   MEDIA_URL              - URL prefix evidence files are served from (default: /media)
//!   MAX_UPLOAD_SIZE_BYTES  - evidence size cap (default: 5 MiB)
//!   ALLOWED_ORIGINS        - comma-separated CORS whitelist (default: http://localhost:3000)

use std::path::PathBuf;

use axum::http::HeaderValue;
use parcel_core::defaults;
use tracing::warn;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub media_root: PathBuf,
    /// URL prefix without a trailing slash.
    pub media_url: String,
    pub max_upload_size_bytes: u64,
    pub allowed_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            media_root: PathBuf::from(defaults::MEDIA_ROOT),
            media_url: defaults::MEDIA_URL.to_string(),
            max_upload_size_bytes: defaults::MAX_UPLOAD_SIZE_BYTES,
            allowed_origins: parse_allowed_origins(defaults::ALLOWED_ORIGINS),
        }
    }
}

impl ServerConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fallback = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(fallback.host),
            port: parse_or("PORT", lookup("PORT"), fallback.port),
            media_root: lookup("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(fallback.media_root),
            media_url: lookup("MEDIA_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(fallback.media_url),
            max_upload_size_bytes: parse_or(
                "MAX_UPLOAD_SIZE_BYTES",
                lookup("MAX_UPLOAD_SIZE_BYTES"),
                fallback.max_upload_size_bytes,
            ),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|s| parse_allowed_origins(&s))
                .unwrap_or(fallback.allowed_origins),
        }
    }

    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upper bound on a whole request body. Larger than the upload cap so an
    /// oversize image still reaches validation and gets a typed 413 body.
    pub fn request_body_limit(&self) -> usize {
        let limit = self
            .max_upload_size_bytes
            .saturating_mul(defaults::REQUEST_BODY_LIMIT_FACTOR);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }

    /// Path under which stored evidence files are served by this process.
    ///
    /// `None` when `MEDIA_URL` points elsewhere (an absolute URL or the root).
    pub fn evidence_mount_path(&self) -> Option<String> {
        if self.media_url.starts_with('/') && self.media_url.len() > 1 {
            Some(format!("{}/{}", self.media_url, defaults::EVIDENCE_DIR))
        } else {
            None
        }
    }
}

fn parse_or<T: std::str::FromStr + std::fmt::Display>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, default = %default, "Invalid numeric config value, using default");
                default
            }
        },
    }
}

/// Parse a comma-separated origin list, skipping entries that are not valid
/// header values. An empty list falls back to the default origin.
pub fn parse_allowed_origins(origins_str: &str) -> Vec<HeaderValue> {
    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        return vec![HeaderValue::from_static(defaults::ALLOWED_ORIGINS)];
    }
    origins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.media_root, PathBuf::from("./media"));
        assert_eq!(config.media_url, "/media");
        assert_eq!(config.max_upload_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.allowed_origins.len(), 1);
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("MEDIA_ROOT", "/srv/media"),
            ("MEDIA_URL", "/files/"),
            ("MAX_UPLOAD_SIZE_BYTES", "1048576"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ]);
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.media_url, "/files");
        assert_eq!(config.max_upload_size_bytes, 1_048_576);
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.allowed_origins[1], "https://b.example");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("MAX_UPLOAD_SIZE_BYTES", "-1")]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_size_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_request_body_limit_exceeds_upload_cap() {
        let config = config_from(&[]);
        assert!(config.request_body_limit() as u64 > config.max_upload_size_bytes);
    }

    #[test]
    fn test_evidence_mount_path() {
        assert_eq!(
            config_from(&[]).evidence_mount_path().as_deref(),
            Some("/media/evidence")
        );
        assert_eq!(
            config_from(&[("MEDIA_URL", "https://cdn.example.com/media")]).evidence_mount_path(),
            None
        );
        assert_eq!(config_from(&[("MEDIA_URL", "/")]).evidence_mount_path(), None);
    }

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins("https://a.example,,http://localhost:3000");
        assert_eq!(origins.len(), 2);

        let origins = parse_allowed_origins("   ");
        assert_eq!(origins, vec![HeaderValue::from_static("http://localhost:3000")]);

        let origins = parse_allowed_origins("https://ok.example,bad\norigin");
        assert_eq!(origins, vec![HeaderValue::from_static("https://ok.example")]);
    }
}
