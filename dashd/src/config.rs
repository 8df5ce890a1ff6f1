use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use thiserror::Error;
use widget::WidgetParams;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    Load(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Empty source name")]
    EmptySourceName,

    #[error("Empty widget name")]
    EmptyWidgetName,

    #[error("Widget {widget} references unknown source: {source_name}")]
    UnknownSource { widget: String, source_name: String },

    #[error("Widget {widget} references operation {operation} not declared by its source")]
    UnknownOperation { widget: String, operation: String },

    #[error("Widget {0} has a zero refresh rate")]
    ZeroRefreshRate(String),
}

#[derive(Clone, Deserialize, Debug)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_cache_capacity() -> u64 {
    1000
}

/// DAO payload cache policy. The original layer cached forever and left
/// eviction to the store; here the TTL is an explicit setting.
#[derive(Deserialize, Debug)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_cache_ttl_secs(),
            capacity: default_cache_capacity(),
        }
    }
}

/// Concrete DAO type behind a source.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Search,
}

impl SourceKind {
    pub fn operations(&self) -> &'static [&'static str] {
        match self {
            SourceKind::Search => dao::SearchDao::OPERATIONS,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

/// One external API: its DAO type, URL templates, and instance options.
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Logical fetch name → URL template with `:name:` placeholders
    pub urls: HashMap<String, String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub auth: Option<AuthConfig>,
}

fn default_value_field() -> String {
    "count".to_string()
}

/// One dashboard tile: which source operation feeds it and how it renders.
#[derive(Debug, Deserialize)]
pub struct WidgetConfig {
    pub source: String,
    pub operation: String,
    /// Call-specific URL placeholder values, merged over the source's
    #[serde(default)]
    pub query_params: HashMap<String, String>,
    /// Payload field holding the tile's numeric reading
    #[serde(default = "default_value_field")]
    pub value_field: String,
    /// Tile markup with `:field:` tokens; defaults to the bare value field
    pub template: Option<String>,
    #[serde(flatten)]
    pub tile: WidgetParams,
}

impl WidgetConfig {
    pub fn template(&self) -> String {
        self.template
            .clone()
            .unwrap_or_else(|| format!(":{}:", self.value_field))
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,
    #[serde(default)]
    pub widgets: HashMap<String, WidgetConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listener.port == 0 {
            return Err(ValidationError::InvalidPort);
        }

        if self.sources.keys().any(String::is_empty) {
            return Err(ValidationError::EmptySourceName);
        }

        for (name, widget) in &self.widgets {
            if name.is_empty() {
                return Err(ValidationError::EmptyWidgetName);
            }

            let source = self.sources.get(&widget.source).ok_or_else(|| {
                ValidationError::UnknownSource {
                    widget: name.clone(),
                    source_name: widget.source.clone(),
                }
            })?;

            if !source.kind.operations().contains(&widget.operation.as_str()) {
                return Err(ValidationError::UnknownOperation {
                    widget: name.clone(),
                    operation: widget.operation.clone(),
                });
            }

            if widget.tile.refresh_rate == 0 {
                return Err(ValidationError::ZeroRefreshRate(name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    const VALID_YAML: &str = r#"
listener:
    host: 0.0.0.0
    port: 8080
cache:
    ttl_secs: 30
sources:
    splunk:
        kind: search
        urls:
            search: "https://search.internal/services/search?q=:query:"
            saved_search: "https://search.internal/services/saved/:name:/results"
        headers:
            x-app-token: t-123
        auth:
            username: dashboard
            password: hunter2
widgets:
    error-count:
        source: splunk
        operation: search
        query_params:
            query: "errors last 5m"
        refresh_rate: 15
        threshold_critical: 5
        threshold_caution: 20
        template: "<span>:count:</span>"
"#;

    #[test]
    fn test_parse_valid_config() {
        let tmp = write_tmp_file(VALID_YAML);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.cache.capacity, 1000);

        let source = &config.sources["splunk"];
        assert_eq!(source.kind, SourceKind::Search);
        assert_eq!(source.urls.len(), 2);
        assert_eq!(source.auth.as_ref().unwrap().username, "dashboard");

        let widget = &config.widgets["error-count"];
        assert_eq!(widget.operation, "search");
        assert_eq!(widget.tile.refresh_rate, 15);
        assert_eq!(widget.tile.threshold_critical, Some(5.0));
        assert_eq!(widget.template(), "<span>:count:</span>");
    }

    #[test]
    fn test_defaults() {
        let tmp = write_tmp_file("sources: {}\n");
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.listener.host, "127.0.0.1");
        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.widgets.is_empty());
    }

    #[test]
    fn test_widget_with_unknown_source() {
        let yaml = r#"
widgets:
    orphan:
        source: nowhere
        operation: search
"#;
        let tmp = write_tmp_file(yaml);
        let err = Config::from_file(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::UnknownSource { .. })
        ));
    }

    #[test]
    fn test_widget_with_undeclared_operation() {
        let yaml = r#"
sources:
    splunk:
        kind: search
        urls: {}
widgets:
    bad-op:
        source: splunk
        operation: alerts
"#;
        let tmp = write_tmp_file(yaml);
        let err = Config::from_file(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::UnknownOperation { operation, .. })
                if operation == "alerts"
        ));
    }

    #[test]
    fn test_zero_refresh_rate_rejected() {
        let yaml = r#"
sources:
    splunk:
        kind: search
        urls: {}
widgets:
    too-fast:
        source: splunk
        operation: search
        refresh_rate: 0
"#;
        let tmp = write_tmp_file(yaml);
        let err = Config::from_file(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::ZeroRefreshRate(name)) if name == "too-fast"
        ));
    }

    #[test]
    fn test_unknown_source_kind_rejected_at_parse() {
        let yaml = r#"
sources:
    splunk:
        kind: graphite
        urls: {}
"#;
        let tmp = write_tmp_file(yaml);
        assert!(matches!(
            Config::from_file(tmp.path()).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
