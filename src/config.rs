//! Application-level configuration loading: listen port and storage backend.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LOBBY_BACK_CONFIG_PATH";
/// Port used when neither the file nor the environment sets one.
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
/// Storage backend selected at startup.
pub enum StorageSettings {
    /// In-process store; data is lost on restart.
    Memory,
    /// MongoDB deployment supporting transactions (replica set or sharded cluster).
    Mongo {
        /// Connection string.
        uri: String,
        /// Database name; the backend default applies when absent.
        #[serde(default)]
        database: Option<String>,
    },
}

impl StorageSettings {
    /// Short name of the selected backend.
    pub fn backend(&self) -> &'static str {
        match self {
            StorageSettings::Memory => "memory",
            StorageSettings::Mongo { .. } => "mongo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// Storage backend to connect.
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Load the configuration from disk, then apply environment overrides.
    ///
    /// Missing or malformed files fall back to built-in defaults.
    pub fn load() -> Self {
        Self::from_file().with_overrides(|key| env::var(key).ok())
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        port = app_config.port,
                        storage = ?app_config.storage,
                        "loaded configuration file"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply `PORT`/`SERVER_PORT`, `MONGO_URI` and `MONGO_DB` on top of the file values.
    ///
    /// Setting `MONGO_URI` selects the MongoDB backend.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT").or_else(|| lookup("SERVER_PORT"));
        if let Some(value) = port {
            match value.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(err) => warn!(value = %value, error = %err, "ignoring invalid port override"),
            }
        }

        if let Some(uri) = lookup("MONGO_URI") {
            let database = match &self.storage {
                StorageSettings::Mongo { database, .. } => database.clone(),
                StorageSettings::Memory => None,
            };
            self.storage = StorageSettings::Mongo { uri, database };
        }

        if let Some(name) = lookup("MONGO_DB").filter(|value| !value.is_empty()) {
            if let StorageSettings::Mongo { database, .. } = &mut self.storage {
                *database = Some(name);
            }
        }

        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage: StorageSettings::Memory,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    storage: Option<StorageSettings>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            port: value.port.unwrap_or(defaults.port),
            storage: value.storage.unwrap_or(defaults.storage),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn file_without_storage_uses_memory() {
        let raw: RawConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.port, 9000);
        assert_eq!(config.storage, StorageSettings::Memory);
    }

    #[test]
    fn file_can_select_mongo() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"storage": {"kind": "mongo", "uri": "mongodb://db:27017/?replicaSet=rs0"}}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(
            config.storage,
            StorageSettings::Mongo {
                uri: "mongodb://db:27017/?replicaSet=rs0".into(),
                database: None,
            }
        );
    }

    #[test]
    fn port_override_prefers_port_over_server_port() {
        let config =
            AppConfig::default().with_overrides(lookup(&[("PORT", "7000"), ("SERVER_PORT", "7001")]));
        assert_eq!(config.port, 7000);

        let config = AppConfig::default().with_overrides(lookup(&[("SERVER_PORT", "7001")]));
        assert_eq!(config.port, 7001);
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let config = AppConfig::default().with_overrides(lookup(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn mongo_uri_switches_backend_and_db_name_applies() {
        let config = AppConfig::default().with_overrides(lookup(&[
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("MONGO_DB", "lobby_test"),
        ]));
        assert_eq!(
            config.storage,
            StorageSettings::Mongo {
                uri: "mongodb://localhost:27017".into(),
                database: Some("lobby_test".into()),
            }
        );
    }

    #[test]
    fn db_name_alone_keeps_memory_backend() {
        let config = AppConfig::default().with_overrides(lookup(&[("MONGO_DB", "lobby_test")]));
        assert_eq!(config.storage, StorageSettings::Memory);
    }
}
