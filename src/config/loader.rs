//! Configuration loading from the process environment.

use std::env;

use crate::config::schema::{AllowList, RelayConfig};

/// Load configuration from the process environment.
///
/// Missing variables fall back to defaults; a malformed `DOMAIN_WHITELIST`
/// or `PORT` is logged and ignored rather than failing startup.
pub fn load_from_env() -> RelayConfig {
    load_from_vars(|name| env::var(name).ok())
}

/// Load configuration from an arbitrary variable lookup.
///
/// Split out from [`load_from_env`] so tests can inject variables without
/// mutating the (process-global) environment.
pub fn load_from_vars(lookup: impl Fn(&str) -> Option<String>) -> RelayConfig {
    let mut config = RelayConfig::default();

    if let Some(raw) = lookup("PORT") {
        match raw.parse::<u16>() {
            Ok(port) => config.listener.bind_address = format!("0.0.0.0:{port}"),
            Err(_) => {
                tracing::warn!(value = %raw, "Invalid PORT value, keeping default");
            }
        }
    }

    if let Some(raw) = lookup("DOMAIN_WHITELIST") {
        match AllowList::parse_json(&raw) {
            Ok(list) => config.allow_list = list,
            Err(error) => {
                tracing::warn!(
                    %error,
                    "Error parsing DOMAIN_WHITELIST, using default allow-list"
                );
            }
        }
    }

    if let Some(url) = lookup("UPSTREAM_URL") {
        config.upstream.url = url;
    }

    if let Some(origin) = lookup("UPSTREAM_ORIGIN_HEADER") {
        config.upstream.origin_header = origin;
    }

    if let Some(dir) = lookup("STATIC_DIR") {
        config.static_assets.dir = dir;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> RelayConfig {
        let map = vars(pairs);
        load_from_vars(|name| map.get(name).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = load(&[]);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.allow_list, AllowList::default());
    }

    #[test]
    fn port_overrides_bind_address() {
        let config = load(&[("PORT", "8081")]);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8081");
    }

    #[test]
    fn invalid_port_keeps_default() {
        let config = load(&[("PORT", "eighty")]);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn whitelist_replaces_default_origins() {
        let config = load(&[("DOMAIN_WHITELIST", r#"["https://only.example"]"#)]);
        assert!(config.allow_list.contains("https://only.example"));
        assert!(!config.allow_list.contains("http://localhost:5173"));
    }

    #[test]
    fn malformed_whitelist_falls_back_to_defaults() {
        for raw in ["{broken", r#"{"not":"an array"}"#, "42"] {
            let config = load(&[("DOMAIN_WHITELIST", raw)]);
            assert_eq!(config.allow_list, AllowList::default(), "input: {raw}");
        }
    }

    #[test]
    fn upstream_overrides_apply() {
        let config = load(&[
            ("UPSTREAM_URL", "http://127.0.0.1:9000"),
            ("UPSTREAM_ORIGIN_HEADER", "http://localhost:4000"),
        ]);
        assert_eq!(config.upstream.url, "http://127.0.0.1:9000");
        assert_eq!(config.upstream.origin_header, "http://localhost:4000");
    }
}
