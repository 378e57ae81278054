//! Effective configuration: defaults, then the JSON file, then CLI/env.

use anyhow::{Context, Result};
use std::path::Path;

use letterdesk_types::models::AppConfig;
use letterdesk_types::ConfigError;

use crate::cli::ServeArgs;

pub fn load_config(args: &ServeArgs) -> Result<AppConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => read_config_file(path)?,
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, args);
    config.validated().context("Invalid configuration")
}

fn read_config_file(path: &Path) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::Error::new(ConfigError::NotFound { path: path.display().to_string() })
        } else {
            anyhow::Error::new(e).context(format!("Failed to read {}", path.display()))
        }
    })?;
    AppConfig::from_json(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn apply_overrides(config: &mut AppConfig, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if let Some(key) = &args.api_key {
        config.upstream.api_key = key.trim().to_string();
    }
    if let Some(model) = &args.model {
        config.upstream.model = model.clone();
    }
    if let Some(url) = &args.upstream_url {
        config.upstream.base_url = url.clone();
    }
    if let Some(secs) = args.upstream_timeout {
        config.upstream.timeout_secs = secs;
    }

    if let Some(secret) = &args.session_secret {
        config.session.secret = secret.clone();
    }
    if args.secure_cookie {
        config.session.secure_cookie = true;
    }
    if let Some(url) = &args.store_url {
        config.store.url = Some(url.clone());
    }

    let limits = &mut config.rate_limit;
    if let Some(n) = args.generate_limit {
        limits.generate.max_requests = n;
    }
    if let Some(secs) = args.generate_window {
        limits.generate.window_secs = secs;
    }
    if let Some(n) = args.page_limit {
        limits.page.max_requests = n;
    }
    if let Some(secs) = args.page_window {
        limits.page.window_secs = secs;
    }
    if let Some(policy) = args.failure_policy {
        limits.failure_policy = policy;
    }
    if let Some(trust) = args.trust_forwarded {
        limits.trust_forwarded_headers = trust;
    }

    if let Some(dir) = &args.reference_dir {
        config.documents.reference_dir = Some(dir.clone());
    }
    if let Some(max) = args.max_document_bytes {
        config.documents.max_document_bytes = max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterdesk_types::models::FailurePolicy;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_without_overrides() {
        let config = load_config(&ServeArgs::default()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides_win() {
        let args = ServeArgs {
            port: Some(8080),
            api_key: Some("  sk-ant-xyz \n".to_string()),
            generate_limit: Some(2),
            generate_window: Some(30),
            failure_policy: Some(FailurePolicy::FailOpen),
            reference_dir: Some(PathBuf::from("/srv/reference")),
            trust_forwarded: Some(true),
            secure_cookie: true,
            ..ServeArgs::default()
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.api_key, "sk-ant-xyz");
        assert_eq!(config.rate_limit.generate.max_requests, 2);
        assert_eq!(config.rate_limit.generate.window_secs, 30);
        assert_eq!(config.rate_limit.failure_policy, FailurePolicy::FailOpen);
        assert!(config.rate_limit.trust_forwarded_headers);
        assert!(config.session.secure_cookie);
        assert_eq!(config.documents.reference_dir, Some(PathBuf::from("/srv/reference")));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = ServeArgs { generate_window: Some(0), ..ServeArgs::default() };
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let args = ServeArgs {
            config: Some(PathBuf::from("/nonexistent/letterdesk.json")),
            ..ServeArgs::default()
        };
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("not found"), "{}", err);
    }
}
