//! Configuration schema definitions.
//!
//! All types derive Serde traits and carry defaults so a bare environment
//! produces a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream origin requests are relayed to.
    pub upstream: UpstreamConfig,

    /// Origins permitted to make credentialed cross-origin requests.
    pub allow_list: AllowList,

    /// Static asset serving for non-relay paths.
    pub static_assets: StaticAssetsConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// The fixed upstream origin and the identity presented to it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream service. Paths are appended verbatim after
    /// the relay prefix is stripped.
    pub url: String,

    /// `Origin` header value presented to the upstream. This targets the
    /// upstream's own CORS policy and is deliberately independent of the
    /// relay's allow-list.
    pub origin_header: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://calorie-tracker-server-production.up.railway.app".to_string(),
            origin_header: "http://localhost:3000".to_string(),
        }
    }
}

/// Set of origins allowed to receive credentialed cross-origin responses.
///
/// Immutable after startup; membership checks are exact string matches
/// against the origin as the browser sends it (scheme, host, port).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AllowList {
    origins: Vec<String>,
}

impl AllowList {
    /// Build an allow-list from explicit origins.
    pub fn new(origins: Vec<String>) -> Self {
        Self { origins }
    }

    /// Parse a JSON array of origin strings, as carried by the
    /// `DOMAIN_WHITELIST` environment variable.
    pub fn parse_json(raw: &str) -> Result<Self, serde_json::Error> {
        let origins: Vec<String> = serde_json::from_str(raw)?;
        Ok(Self { origins })
    }

    /// Exact membership check.
    pub fn contains(&self, origin: &str) -> bool {
        self.origins.iter().any(|allowed| allowed == origin)
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "https://calorie-tracker-psi-flame.vercel.app".to_string(),
            ],
        }
    }
}

/// Static asset serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticAssetsConfig {
    /// Directory of pre-built assets.
    pub dir: String,

    /// Fallback file for unmatched paths (single-page-app routing).
    pub index: String,
}

impl Default for StaticAssetsConfig {
    fn default() -> Self {
        Self {
            dir: "dist".to_string(),
            index: "index.html".to_string(),
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes. Bodies are fully buffered before
    /// dispatch, so this bounds per-request memory.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allow_list_covers_local_development() {
        let list = AllowList::default();
        assert!(list.contains("http://localhost:5173"));
        assert!(list.contains("http://localhost:3000"));
        assert!(!list.contains("http://localhost:8080"));
    }

    #[test]
    fn parse_json_accepts_array_of_origins() {
        let list = AllowList::parse_json(r#"["https://a.example","https://b.example"]"#).unwrap();
        assert!(list.contains("https://a.example"));
        assert!(!list.contains("https://c.example"));
    }

    #[test]
    fn parse_json_rejects_invalid_json() {
        assert!(AllowList::parse_json("not json at all").is_err());
    }

    #[test]
    fn parse_json_rejects_non_array_values() {
        assert!(AllowList::parse_json(r#"{"origin":"https://a.example"}"#).is_err());
        assert!(AllowList::parse_json(r#""https://a.example""#).is_err());
    }

    #[test]
    fn membership_is_exact_not_prefix() {
        let list = AllowList::new(vec!["https://app.example".to_string()]);
        assert!(!list.contains("https://app.example.evil.com"));
        assert!(!list.contains("https://app.example/"));
    }
}
