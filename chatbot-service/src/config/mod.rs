use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default upstream classifier timeout.
const DEFAULT_RESPONDER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub common: core_config::Config,
    pub responder: ResponderConfig,
    pub resources: ResourceConfig,
    pub observability: ObservabilityConfig,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub kind: ResponderKind,
    /// Classifier endpoint for [`ResponderKind::Http`].
    pub url: String,
    pub health_url: Option<String>,
    pub timeout_secs: u64,
}

/// Which responder backs `/predict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderKind {
    Http,
    Echo,
}

impl FromStr for ResponderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ResponderKind::Http),
            "echo" => Ok(ResponderKind::Echo),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "RESPONDER_KIND must be 'http' or 'echo', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// Where to fetch the linguistic resource bundle from. `None` skips the download.
    pub bundle_url: Option<String>,
    pub data_dir: PathBuf,
    pub bundle_name: String,
}

impl ResourceConfig {
    pub fn bundle_path(&self) -> PathBuf {
        self.data_dir.join(&self.bundle_name)
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl ChatbotConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_source(common_config, |key| env::var(key).ok())
    }

    /// Build the service settings from variables resolved through `lookup`.
    ///
    /// `ENVIRONMENT=prod` makes every non-optional key required.
    pub fn from_source<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = EnvSource::new(lookup);

        Ok(ChatbotConfig {
            common,
            responder: ResponderConfig {
                kind: vars.get("RESPONDER_KIND", Some("http"))?.parse()?,
                url: vars.get("RESPONDER_URL", Some("http://classifier:5005/classify"))?,
                health_url: vars.optional("RESPONDER_HEALTH_URL"),
                timeout_secs: parse_timeout(&vars.get(
                    "RESPONDER_TIMEOUT_SECS",
                    Some(&DEFAULT_RESPONDER_TIMEOUT_SECS.to_string()),
                )?)?,
            },
            resources: ResourceConfig {
                bundle_url: vars.optional("RESOURCE_BUNDLE_URL"),
                data_dir: vars.get("RESOURCE_DATA_DIR", Some("data"))?.into(),
                bundle_name: vars.get("RESOURCE_BUNDLE_NAME", Some("punkt.zip"))?,
            },
            observability: ObservabilityConfig {
                log_level: vars
                    .optional("LOG_LEVEL")
                    .unwrap_or_else(|| "info".to_string()),
                otlp_endpoint: vars.optional("OTLP_ENDPOINT"),
            },
            static_dir: vars
                .get(
                    "STATIC_DIR",
                    Some(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
                )?
                .into(),
        })
    }
}

fn parse_timeout(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "RESPONDER_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
            raw
        ))),
    }
}

struct EnvSource<F> {
    lookup: F,
    is_prod: bool,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn new(lookup: F) -> Self {
        let is_prod = lookup("ENVIRONMENT").as_deref() == Some("prod");
        Self { lookup, is_prod }
    }

    fn get(&self, key: &str, default: Option<&str>) -> Result<String, AppError> {
        match (self.lookup)(key) {
            Some(val) => Ok(val),
            None => {
                if self.is_prod {
                    Err(AppError::ConfigError(anyhow::anyhow!(
                        "{} is required in production but not set",
                        key
                    )))
                } else if let Some(def) = default {
                    Ok(def.to_string())
                } else {
                    Err(AppError::ConfigError(anyhow::anyhow!(
                        "{} is required but not set",
                        key
                    )))
                }
            }
        }
    }

    /// Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }
}
