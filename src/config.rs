use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::graph::GraphFormat;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub graph: GraphConfig,
    pub registry: RegistryConfig,
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Target graph naming
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Namespace every minted reference lives under, e.g. `http://vivo.brown.edu/individual/`.
    pub namespace: String,
    #[serde(default = "default_course_prefix")]
    pub course_prefix: String,
    #[serde(default)]
    pub format: GraphFormat,
}

/// Registry (SPARQL query endpoint) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub query_url: String,
    #[serde(default = "default_email_env")]
    pub email_env: String,
    #[serde(default = "default_password_env")]
    pub password_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Directory lookup service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    pub base_url: String,
    #[serde(default = "default_short_id_attribute")]
    pub short_id_attribute: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Input decoding
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
        }
    }
}

/// Side logs and log level
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_level: default_log_level(),
        }
    }
}

fn default_course_prefix() -> String {
    "course".to_string()
}

fn default_email_env() -> String {
    "REGISTRY_EMAIL".to_string()
}

fn default_password_env() -> String {
    "REGISTRY_PASSWORD".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_short_id_attribute() -> String {
    "brownshortid".to_string()
}

fn default_concurrency() -> usize {
    8
}

fn default_encoding() -> String {
    "windows-1252".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("log")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. `explicit` path (the `--config` flag)
    /// 2. Path specified in COURSEGRAPH_CONFIG environment variable
    /// 3. ./config.toml in current directory
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        // Optional: credentials may come from the real environment instead
        let _ = dotenv::dotenv();

        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => std::env::var("COURSEGRAPH_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config.toml")),
        };

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let namespace = Url::parse(&self.graph.namespace)
            .with_context(|| format!("graph.namespace is not an absolute IRI: {}", self.graph.namespace))?;
        if !(self.graph.namespace.ends_with('/') || self.graph.namespace.ends_with('#')) {
            anyhow::bail!(
                "graph.namespace must end with '/' or '#': {}",
                namespace
            );
        }

        if self.graph.course_prefix.trim().is_empty() {
            anyhow::bail!("graph.course_prefix must not be empty");
        }

        Url::parse(&self.registry.query_url)
            .with_context(|| format!("registry.query_url is not a valid URL: {}", self.registry.query_url))?;
        Url::parse(&self.directory.base_url)
            .with_context(|| format!("directory.base_url is not a valid URL: {}", self.directory.base_url))?;

        for var in [&self.registry.email_env, &self.registry.password_env] {
            std::env::var(var).with_context(|| {
                format!(
                    "Environment variable {} not set. Set it in your .env file or as an environment variable with your registry credentials.",
                    var
                )
            })?;
        }

        if self.directory.concurrency == 0 {
            anyhow::bail!("directory.concurrency must be greater than 0");
        }

        if self.registry.timeout_secs == 0 || self.directory.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than 0");
        }

        if encoding_rs::Encoding::for_label(self.ingest.encoding.as_bytes()).is_none() {
            anyhow::bail!("ingest.encoding is not a known encoding label: {}", self.ingest.encoding);
        }

        Ok(())
    }

    /// Registry credentials (email, password) from the configured env vars
    pub fn registry_credentials(&self) -> Result<(String, String)> {
        let email = std::env::var(&self.registry.email_env)
            .with_context(|| format!("Environment variable {} not set", self.registry.email_env))?;
        let password = std::env::var(&self.registry.password_env)
            .with_context(|| format!("Environment variable {} not set", self.registry.password_env))?;
        Ok((email, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn test_config(format: &str) -> String {
        format!(
            r#"
[graph]
namespace = "http://vivo.brown.edu/individual/"
format = "{}"

[registry]
query_url = "https://vivo.example.edu/api/sparqlQuery"
email_env = "CG_TEST_EMAIL"
password_env = "CG_TEST_PASSWORD"

[directory]
base_url = "https://directory.example.edu/people"
concurrency = 4

[logging]
log_dir = "./log"
log_level = "debug"
"#,
            format
        )
    }

    fn with_credentials(present: bool, f: impl FnOnce()) {
        if present {
            std::env::set_var("CG_TEST_EMAIL", "admin@example.edu");
            std::env::set_var("CG_TEST_PASSWORD", "secret");
        } else {
            std::env::remove_var("CG_TEST_EMAIL");
            std::env::remove_var("CG_TEST_PASSWORD");
        }
        f();
        std::env::remove_var("CG_TEST_EMAIL");
        std::env::remove_var("CG_TEST_PASSWORD");
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, test_config("turtle")).unwrap();

        with_credentials(true, || {
            let config = Config::load(Some(&config_path));
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.logging.log_level, "debug");
            assert_eq!(config.directory.concurrency, 4);
            assert_eq!(config.directory.short_id_attribute, "brownshortid");
            assert_eq!(config.graph.course_prefix, "course");
            assert_eq!(config.ingest.encoding, "windows-1252");
            assert_eq!(config.registry.timeout_secs, 30);
            assert_eq!(config.graph.format, GraphFormat::Turtle);

            let (email, password) = config.registry_credentials().unwrap();
            assert_eq!(email, "admin@example.edu");
            assert_eq!(password, "secret");
        });
    }

    #[test]
    fn test_config_missing_credentials() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, test_config("turtle")).unwrap();

        with_credentials(false, || {
            let config = Config::load(Some(&config_path));
            assert!(config.is_err(), "Expected missing credential error");
            assert!(config.unwrap_err().to_string().contains("CG_TEST_EMAIL"));
        });
    }

    #[test]
    fn test_config_ntriples_format() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, test_config("n-triples")).unwrap();

        with_credentials(true, || {
            let config = Config::load(Some(&config_path)).unwrap();
            assert_eq!(config.graph.format, GraphFormat::NTriples);
        });
    }

    #[test]
    fn test_config_rejects_zero_concurrency() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let content = test_config("turtle").replace("concurrency = 4", "concurrency = 0");
        fs::write(&config_path, content).unwrap();

        with_credentials(true, || {
            let err = Config::load(Some(&config_path)).unwrap_err();
            assert!(err.to_string().contains("concurrency"));
        });
    }

    #[test]
    fn test_config_rejects_unknown_encoding() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let content = format!("{}\n[ingest]\nencoding = \"klingon-8\"\n", test_config("turtle"));
        fs::write(&config_path, content).unwrap();

        with_credentials(true, || {
            let err = Config::load(Some(&config_path)).unwrap_err();
            assert!(err.to_string().contains("klingon-8"));
        });
    }

    #[test]
    fn test_config_rejects_relative_namespace() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let content = test_config("turtle")
            .replace("http://vivo.brown.edu/individual/", "individual/");
        fs::write(&config_path, content).unwrap();

        with_credentials(true, || {
            assert!(Config::load(Some(&config_path)).is_err());
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let config = Config::load(Some(Path::new("nonexistent.toml")));
        assert!(config.is_err());
    }
}
