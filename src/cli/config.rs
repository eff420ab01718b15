//! Application configuration
//!
//! ```json
//! {
//!   "confidence_threshold": 70,
//!   "session_idle_minutes": 30,
//!   "store": "file",
//!   "data_dir": "./sessions",
//!   "catalog_path": "./catalog.json",
//!   "http": { "host": "127.0.0.1", "port": 8088 }
//! }
//! ```
//!
//! Every field is optional except `data_dir` when `store` is `file`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::catalog::Catalog;
use crate::engine::{DiagnosisEngine, DiagnosisService};
use crate::http_server::{HttpServerConfig, SharedStore};
use crate::observability::{log_event, Event};
use crate::session::{TerminationPolicy, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::store::{FileSessionStore, InMemorySessionStore, DEFAULT_IDLE_MINUTES};

/// One year
const MAX_IDLE_MINUTES: u64 = 525_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Top weight at which an interview stops, in (0, 100]
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Inactivity window before a session is evicted
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,

    #[serde(default)]
    pub store: StoreKind,

    /// Session directory for the file store
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// JSON catalog; the built-in catalog is used when absent
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_session_idle_minutes() -> u64 {
    DEFAULT_IDLE_MINUTES as u64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            session_idle_minutes: default_session_idle_minutes(),
            store: StoreKind::default(),
            data_dir: None,
            catalog_path: None,
            http: HttpServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from file, or defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
        let config = Self::from_json_str(&content)?;
        let shown = path.display().to_string();
        log_event(Event::ConfigLoaded, &[("path", shown.as_str())]);
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> CliResult<Self> {
        let config: AppConfig = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 100.0) {
            return Err(CliError::config_error(format!(
                "confidence_threshold must be in (0, 100], got {}",
                self.confidence_threshold
            )));
        }

        if self.session_idle_minutes == 0 {
            return Err(CliError::config_error("session_idle_minutes must be > 0"));
        }
        if self.session_idle_minutes > MAX_IDLE_MINUTES {
            return Err(CliError::config_error(format!(
                "session_idle_minutes must be <= {}",
                MAX_IDLE_MINUTES
            )));
        }

        if self.store == StoreKind::File && self.data_dir.is_none() {
            return Err(CliError::config_error("data_dir is required when store is 'file'"));
        }

        Ok(())
    }

    pub fn idle_ttl(&self) -> Duration {
        Duration::minutes(self.session_idle_minutes.min(MAX_IDLE_MINUTES) as i64)
    }

    pub fn policy(&self) -> TerminationPolicy {
        TerminationPolicy::new(self.confidence_threshold)
    }

    pub fn load_catalog(&self) -> CliResult<Catalog> {
        load_catalog(self.catalog_path.as_deref())
    }

    pub fn build_store(&self) -> CliResult<SharedStore> {
        match self.store {
            StoreKind::Memory => Ok(Arc::new(InMemorySessionStore::with_idle_ttl(self.idle_ttl()))),
            StoreKind::File => {
                let dir = self.data_dir.as_deref().ok_or_else(|| {
                    CliError::config_error("data_dir is required when store is 'file'")
                })?;
                let store = FileSessionStore::open_with_idle_ttl(dir, self.idle_ttl())
                    .map_err(|e| CliError::boot_failed(e.to_string()))?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Catalog, store and engine wired into a service
    pub fn build_service(&self) -> CliResult<DiagnosisService<SharedStore>> {
        let catalog = Arc::new(self.load_catalog()?);
        let store = self.build_store()?;
        Ok(DiagnosisService::new(
            DiagnosisEngine::new(catalog, self.policy()),
            store,
        ))
    }
}

/// Built-in catalog, or the validated file at `path`
pub fn load_catalog(path: Option<&Path>) -> CliResult<Catalog> {
    let (catalog, source) = match path {
        Some(path) => (Catalog::from_json_file(path)?, path.display().to_string()),
        None => (Catalog::builtin()?, "builtin".to_string()),
    };
    let categories = catalog.len().to_string();
    log_event(
        Event::CatalogLoaded,
        &[("source", source.as_str()), ("categories", categories.as_str())],
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.confidence_threshold, 70.0);
        assert_eq!(config.session_idle_minutes, 30);
        assert_eq!(config.store, StoreKind::Memory);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        for body in [r#"{"confidence_threshold": 0}"#, r#"{"confidence_threshold": 120}"#] {
            let err = AppConfig::from_json_str(body).unwrap_err();
            assert_eq!(err.code_str(), "DIAG_CLI_CONFIG_ERROR");
        }
    }

    #[test]
    fn test_file_store_requires_data_dir() {
        assert!(AppConfig::from_json_str(r#"{"store": "file"}"#).is_err());
        assert!(AppConfig::from_json_str(r#"{"store": "file", "data_dir": "/tmp/x"}"#).is_ok());
    }

    #[test]
    fn test_rejects_unknown_store() {
        assert!(AppConfig::from_json_str(r#"{"store": "redis"}"#).is_err());
    }

    #[test]
    fn test_load_from_file_and_build_service() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("autodiag.json");
        let sessions = dir.path().join("sessions");
        fs::write(
            &path,
            serde_json::json!({
                "store": "file",
                "data_dir": sessions,
                "confidence_threshold": 65,
                "http": {"port": 9100}
            })
            .to_string(),
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.http.port, 9100);
        assert_eq!(config.policy().confidence_threshold(), 65.0);

        let service = config.build_service().unwrap();
        assert_eq!(service.engine().catalog().len(), 5);
        assert!(sessions.exists());
    }

    #[test]
    fn test_missing_config_file() {
        let err = AppConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.code_str(), "DIAG_CLI_CONFIG_ERROR");
    }
}
