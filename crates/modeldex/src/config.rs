use modeldex_schema::build::LoadOptions;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Overrides `snapshot` from the configuration file.
pub const SNAPSHOT_ENV: &str = "MODELDEX_SNAPSHOT";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no snapshot path configured (set `snapshot` or MODELDEX_SNAPSHOT)")]
    MissingSnapshot,
}

///
/// Config
///
/// ```toml
/// snapshot = "schema/shopify.json"
///
/// [load]
/// max_state_depth = 32
/// strict_inverses = true
///
/// [log]
/// filter = "modeldex=debug"
/// ```
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub snapshot: Option<PathBuf>,
    pub load: LoadOptions,
    pub log: LogConfig,
}

impl Config {
    pub fn from_toml_str(source: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source, path)
    }

    /// Apply environment overrides on top of file values.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(SNAPSHOT_ENV).filter(|p| !p.is_empty()) {
            self.snapshot = Some(PathBuf::from(path));
        }

        self
    }

    pub fn snapshot_path(&self) -> Result<&Path, ConfigError> {
        self.snapshot.as_deref().ok_or(ConfigError::MissingSnapshot)
    }
}

///
/// LogConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives, used when the
    /// environment does not set any.
    pub filter: Option<String>,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml_str("", "empty.toml").expect("parses");

        assert_eq!(config, Config::default());
        assert_eq!(config.load.max_state_depth, 32);
        assert!(matches!(
            config.snapshot_path(),
            Err(ConfigError::MissingSnapshot)
        ));
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            snapshot = "schema.json"

            [load]
            max_state_depth = 8
            strict_inverses = false
            system_fields = ["id"]

            [log]
            filter = "modeldex=trace"
            "#,
            "modeldex.toml",
        )
        .expect("parses");

        assert_eq!(config.snapshot_path().expect("set"), Path::new("schema.json"));
        assert_eq!(config.load.max_state_depth, 8);
        assert!(!config.load.strict_inverses);
        assert!(config.load.require_system_fields);
        assert_eq!(config.load.system_fields, vec!["id".to_string()]);
        assert_eq!(config.log.filter.as_deref(), Some("modeldex=trace"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("snapshots = \"x\"", "typo.toml").unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("typo.toml"));
    }

    #[test]
    fn environment_overrides_the_file() {
        let config = Config::from_toml_str("snapshot = \"file.json\"", "modeldex.toml")
            .expect("parses")
            .with_env_from(|key| (key == SNAPSHOT_ENV).then(|| "env.json".to_string()));
        assert_eq!(config.snapshot_path().expect("set"), Path::new("env.json"));

        let config = Config::default().with_env_from(|_| Some(String::new()));
        assert!(config.snapshot.is_none());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("modeldex.toml");
        fs::write(&path, "[load]\nrequire_system_fields = false\n").expect("write");

        let config = Config::from_path(&path).expect("reads");
        assert!(!config.load.require_system_fields);

        let err = Config::from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
