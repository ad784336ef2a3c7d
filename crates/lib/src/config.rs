//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.hookrelay/config.json`) and environment.
//! Every field is optional; a missing file yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// WeCom group-robot webhook endpoint; the destination key is appended as `?key=`.
pub const DEFAULT_WEIXIN_WEBHOOK_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway listener settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Relay channel settings (e.g. WeCom).
    #[serde(default)]
    pub channels: ChannelsConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 80).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Largest accepted request body in bytes. Unset means no limit.
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

fn default_gateway_port() -> u16 {
    80
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            max_body_bytes: None,
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub weixin: WeixinChannelConfig,
}

/// WeCom (企业微信) group-robot channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeixinChannelConfig {
    /// Register the `weixin` route (default true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Delivery endpoint. Overridden by WEIXIN_WEBHOOK_URL env when set.
    pub webhook_url: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for WeixinChannelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webhook_url: None,
        }
    }
}

/// Resolve the WeCom delivery endpoint: env WEIXIN_WEBHOOK_URL overrides config, which overrides the built-in URL.
pub fn resolve_weixin_webhook_url(config: &Config) -> String {
    std::env::var("WEIXIN_WEBHOOK_URL")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .channels
                .weixin
                .webhook_url
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_WEIXIN_WEBHOOK_URL.to_string())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("HOOKRELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".hookrelay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, else the default path (or HOOKRELAY_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 80);
        assert_eq!(g.bind, "0.0.0.0");
        assert_eq!(g.max_body_bytes, None);
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.gateway.port, 80);
        assert!(config.channels.weixin.enabled);
        assert!(config.channels.weixin.webhook_url.is_none());
    }

    #[test]
    fn camel_case_keys() {
        let config: Config = serde_json::from_str(
            r#"{"gateway":{"port":8080,"maxBodyBytes":1048576},"channels":{"weixin":{"enabled":false,"webhookUrl":"http://127.0.0.1:9/send"}}}"#,
        )
        .unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.bind, "0.0.0.0");
        assert_eq!(config.gateway.max_body_bytes, Some(1048576));
        assert!(!config.channels.weixin.enabled);
        assert_eq!(
            config.channels.weixin.webhook_url.as_deref(),
            Some("http://127.0.0.1:9/send")
        );
    }

    #[test]
    fn load_config_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("hookrelay-missing-config-does-not-exist.json");
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(config.gateway.port, 80);
    }

    #[test]
    fn blank_configured_url_falls_back_to_default() {
        if std::env::var("WEIXIN_WEBHOOK_URL").is_ok() {
            return;
        }
        let mut config = Config::default();
        config.channels.weixin.webhook_url = Some("   ".to_string());
        assert_eq!(resolve_weixin_webhook_url(&config), DEFAULT_WEIXIN_WEBHOOK_URL);
        config.channels.weixin.webhook_url = Some(" http://localhost:1/send ".to_string());
        assert_eq!(resolve_weixin_webhook_url(&config), "http://localhost:1/send");
    }
}
