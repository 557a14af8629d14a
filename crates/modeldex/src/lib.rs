//! ## Crate layout
//! - `schema`: the registry core (snapshot types, descriptors, load/validate, lookups).
//! - `config`: TOML configuration with environment overrides.
//! - `error`: stable kind + origin error taxonomy for callers.
//! - `logging`: tracing subscriber bootstrap.
//!
//! Most callers only need [`open`] and the `prelude`.

pub use modeldex_schema as schema;

pub mod config;
pub mod error;
pub mod logging;

use crate::config::Config;
use modeldex_schema::{handle::RegistryHandle, raw::RawSnapshot, registry::Registry};
use std::{path::Path, time::Instant};
use tracing::info;

pub use config::ConfigError;
pub use error::{Error, ErrorKind, ErrorOrigin};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind, ErrorOrigin, config::Config, load_registry, open,
        schema::prelude::*,
    };
}

/// Read and validate the snapshot at `path`.
pub fn load_registry(path: impl AsRef<Path>, config: &Config) -> Result<Registry, Error> {
    let path = path.as_ref();
    let started = Instant::now();

    let snapshot = RawSnapshot::from_path(path)?;
    let registry = Registry::from_snapshot(snapshot, &config.load)?;
    info!(
        path = %path.display(),
        models = registry.len(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "snapshot opened"
    );

    Ok(registry)
}

/// Load the configured snapshot into a handle ready for sharing.
pub fn open(config: &Config) -> Result<RegistryHandle, Error> {
    let path = config.snapshot_path()?;
    let registry = load_registry(path, config)?;

    Ok(RegistryHandle::new(registry))
}

/// Reload the configured snapshot into an existing handle.
pub fn reload(
    handle: &RegistryHandle,
    config: &Config,
) -> Result<schema::evolution::EvolutionReport, Error> {
    let path = config.snapshot_path()?;
    let snapshot = RawSnapshot::from_path(path)?;

    Ok(handle.reload(snapshot, &config.load)?)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SNAPSHOT: &str = include_str!("../../modeldex-schema/tests/fixtures/shopify.json");

    fn config_for(dir: &Path) -> Config {
        let path = dir.join("schema.json");
        fs::write(&path, SNAPSHOT).expect("write snapshot");

        Config {
            snapshot: Some(path),
            ..Config::default()
        }
    }

    #[test]
    fn open_loads_the_configured_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let handle = open(&config_for(dir.path())).expect("opens");

        let registry = handle.current();
        assert_eq!(registry.len(), 6);
        assert!(registry.get_model("api:shopifyShop").is_ok());
    }

    #[test]
    fn open_without_a_snapshot_is_a_config_error() {
        let err = open(&Config::default()).unwrap_err();

        assert_eq!(err.kind, ErrorKind::Config);
        assert_eq!(err.origin, ErrorOrigin::Config);
    }

    #[test]
    fn reload_keeps_the_old_registry_when_the_file_turns_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_for(dir.path());
        let handle = open(&config).expect("opens");
        let before = handle.current();

        let path = config.snapshot.clone().expect("path");
        fs::write(&path, SNAPSHOT.replace("\"api:session\"", "\"api:sessions\""))
            .expect("rewrite snapshot");

        let err = reload(&handle, &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Integrity);
        assert!(std::sync::Arc::ptr_eq(&before, &handle.current()));
    }
}
