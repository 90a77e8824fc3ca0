//! Bridge configuration, loadable from JSON or YAML.
//!
//! ```rust
//! use opentool::BridgeConfig;
//!
//! let config = BridgeConfig::parse(
//!     r#"
//! openApiUrl: https://api.example.com/openapi.json
//! tools:
//!   naming:
//!     strategy: endpoint
//!     maxLength: 48
//!   mock: true
//! liveReload:
//!   enabled: true
//! "#,
//! )
//! .expect("config should parse");
//!
//! assert_eq!(config.user_agent, "openapi-mcp");
//! assert_eq!(config.tools.naming.max_length, Some(48));
//! assert!(config.tools.json_double_serialization_mitigation);
//! assert_eq!(config.live_reload.interval_secs, 600);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use otooling::{NamingConfig, SchemaConfig};
use serde::{Deserialize, Serialize};

use crate::{BridgeError, DocumentSource, FileSource, StaticSource};

pub const DEFAULT_USER_AGENT: &str = "openapi-mcp";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_RELOAD_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_RELOAD_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    pub open_api_url: Option<String>,
    pub open_api_path: Option<PathBuf>,
    /// Document text embedded in the configuration itself.
    pub open_api_inline: Option<String>,
    pub api_base_url: Option<String>,
    pub server_index: Option<usize>,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Outbound `User-Agent`; blank disables the header.
    pub user_agent: String,
    /// Document filter name to enabled flag. Unlisted filters run.
    pub filters: HashMap<String, bool>,
    pub tools: ToolsConfig,
    pub live_reload: LiveReloadConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            open_api_url: None,
            open_api_path: None,
            open_api_inline: None,
            api_base_url: None,
            server_index: None,
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            filters: HashMap::new(),
            tools: ToolsConfig::default(),
            live_reload: LiveReloadConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolsConfig {
    pub naming: NamingConfig,
    pub schema: SchemaConfig,
    pub json_double_serialization_mitigation: bool,
    pub prepend_summary_to_description: bool,
    pub mock: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            schema: SchemaConfig::default(),
            json_double_serialization_mitigation: true,
            prepend_summary_to_description: true,
            mock: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveReloadConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub max_retries: u32,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: DEFAULT_RELOAD_INTERVAL_SECS,
            max_retries: DEFAULT_RELOAD_MAX_RETRIES,
        }
    }
}

impl LiveReloadConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl BridgeConfig {
    /// Parses JSON when the text looks like a JSON object, YAML otherwise.
    pub fn parse(text: &str) -> Result<Self, BridgeError> {
        if text.trim_start().starts_with('{') {
            Self::from_json_str(text)
        } else {
            Self::from_yaml_str(text)
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, BridgeError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|err| BridgeError::config(format!("invalid JSON configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, BridgeError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|err| BridgeError::config(format!("invalid YAML configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|err| {
            BridgeError::config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::parse(&text)
    }

    pub fn with_open_api_url(mut self, url: impl Into<String>) -> Self {
        self.open_api_url = Some(url.into());
        self
    }

    pub fn with_open_api_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_api_path = Some(path.into());
        self
    }

    pub fn with_open_api_inline(mut self, document: impl Into<String>) -> Self {
        self.open_api_inline = Some(document.into());
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_server_index(mut self, index: usize) -> Self {
        self.server_index = Some(index);
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout_ms = connect.as_millis() as u64;
        self.read_timeout_ms = read.as_millis() as u64;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_filter_enabled(mut self, filter: impl Into<String>, enabled: bool) -> Self {
        self.filters.insert(filter.into(), enabled);
        self
    }

    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.tools.naming = naming;
        self
    }

    pub fn with_schema(mut self, schema: SchemaConfig) -> Self {
        self.tools.schema = schema;
        self
    }

    pub fn with_double_serialization_mitigation(mut self, enabled: bool) -> Self {
        self.tools.json_double_serialization_mitigation = enabled;
        self
    }

    pub fn with_prepend_summary_to_description(mut self, enabled: bool) -> Self {
        self.tools.prepend_summary_to_description = enabled;
        self
    }

    pub fn with_mock(mut self, enabled: bool) -> Self {
        self.tools.mock = enabled;
        self
    }

    pub fn with_live_reload(mut self, live_reload: LiveReloadConfig) -> Self {
        self.live_reload = live_reload;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(BridgeError::config("timeouts must be greater than zero"));
        }
        if self.tools.schema.params_key.is_empty() || self.tools.schema.body_key.is_empty() {
            return Err(BridgeError::config("paramsKey and bodyKey must not be empty"));
        }
        if self.tools.schema.params_key == self.tools.schema.body_key {
            return Err(BridgeError::config("paramsKey and bodyKey must differ"));
        }
        if self.tools.naming.max_length == Some(0) {
            return Err(BridgeError::config("tools.naming.maxLength must be greater than zero"));
        }
        if self.live_reload.enabled {
            if self.live_reload.interval_secs == 0 {
                return Err(BridgeError::config("liveReload.intervalSecs must be greater than zero"));
            }
            if self.live_reload.max_retries == 0 {
                return Err(BridgeError::config("liveReload.maxRetries must be at least 1"));
            }
        }
        Ok(())
    }

    /// Picks the document source: inline text, then a file path, then a URL.
    pub fn document_source(&self) -> Result<Arc<dyn DocumentSource>, BridgeError> {
        if let Some(document) = &self.open_api_inline {
            let mut source = StaticSource::new(document.clone());
            if let Some(url) = &self.open_api_url {
                source = source.with_location(url.clone());
            }
            return Ok(Arc::new(source));
        }
        if let Some(path) = &self.open_api_path {
            return Ok(Arc::new(FileSource::new(path.clone())));
        }
        if let Some(url) = &self.open_api_url {
            return url_source(self, url);
        }
        Err(BridgeError::config(
            "one of openApiInline, openApiPath or openApiUrl must be set",
        ))
    }
}

#[cfg(feature = "http-transport")]
fn url_source(config: &BridgeConfig, url: &str) -> Result<Arc<dyn DocumentSource>, BridgeError> {
    let source =
        crate::UrlSource::with_timeouts(url, config.connect_timeout(), config.read_timeout())?;
    Ok(Arc::new(source))
}

#[cfg(not(feature = "http-transport"))]
fn url_source(_config: &BridgeConfig, url: &str) -> Result<Arc<dyn DocumentSource>, BridgeError> {
    Err(BridgeError::config(format!(
        "cannot fetch {url}: built without the http-transport feature"
    )))
}
