use crate::{
    build::LoadOptions, error::SchemaIntegrityError, evolution::EvolutionReport, raw::RawSnapshot,
    registry::Registry,
};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

///
/// RegistryHandle
///
/// Publishes the current registry to concurrent readers. Readers clone the
/// `Arc` and keep using it for as long as they like; a reload swaps the
/// pointer, so a reader sees either the old registry or the new one.
///

#[derive(Debug)]
pub struct RegistryHandle {
    current: RwLock<Arc<Registry>>,
}

impl RegistryHandle {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    #[must_use]
    pub fn current(&self) -> Arc<Registry> {
        // the guarded value is a single Arc, so a poisoned lock is still consistent
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);

        Arc::clone(&guard)
    }

    /// Publish `registry`, returning the one it replaces.
    pub fn replace(&self, registry: Registry) -> Arc<Registry> {
        let next = Arc::new(registry);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);

        std::mem::replace(&mut *guard, next)
    }

    /// Load `snapshot` and publish it if it is valid. On failure the current
    /// registry stays in place. The fingerprint check, the diff and the swap
    /// happen under one write lock, so concurrent reloads apply one at a time
    /// and each report describes the registry it actually replaced.
    pub fn reload(
        &self,
        snapshot: RawSnapshot,
        options: &LoadOptions,
    ) -> Result<EvolutionReport, SchemaIntegrityError> {
        let next = Registry::from_snapshot(snapshot, options)?;
        let fingerprint = next.fingerprint();

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if guard.fingerprint() == fingerprint {
            info!(%fingerprint, "schema unchanged; reload skipped");
            return Ok(EvolutionReport::default());
        }

        let report = EvolutionReport::between(&guard, &next);
        let previous = std::mem::replace(&mut *guard, Arc::new(next));
        drop(guard);

        for finding in report.findings() {
            warn!(protected = finding.is_protected(), "schema evolution: {finding}");
        }
        info!(
            %fingerprint,
            previous = %previous.fingerprint(),
            findings = report.findings().len(),
            "schema registry replaced"
        );

        Ok(report)
    }
}

///
/// TESTS
///
