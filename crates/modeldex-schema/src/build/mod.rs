use crate::{
    DEFAULT_MAX_STATE_DEPTH, SYSTEM_FIELDS,
    error::{SchemaIntegrityError, Violations},
    node::ModelDescriptor,
    raw::RawSnapshot,
    registry::Registry,
    validate::validate_registry,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Instant};
use tracing::{debug, info, warn};

///
/// LoadOptions
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    /// Deepest state nesting accepted; top-level states are depth 1.
    pub max_state_depth: usize,

    /// Require every model to carry the fields named in `system_fields`.
    pub require_system_fields: bool,

    /// Field api identifiers treated as implicit system fields.
    pub system_fields: Vec<String>,

    /// Fail the load on asymmetric HasMany inverses. When off, such edges load
    /// and surface later as broken relationships on resolution.
    pub strict_inverses: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_state_depth: DEFAULT_MAX_STATE_DEPTH,
            require_system_fields: true,
            system_fields: SYSTEM_FIELDS.iter().map(ToString::to_string).collect(),
            strict_inverses: true,
        }
    }
}

// build_registry
// decode, validate, then assemble; nothing is returned unless all three pass
pub(crate) fn build_registry(
    snapshot: RawSnapshot,
    options: &LoadOptions,
) -> Result<Registry, SchemaIntegrityError> {
    let started = Instant::now();
    let fingerprint = snapshot.fingerprint();
    let mut errs = Violations::new();

    // Phase 1: typed nodes (configuration variants, state arenas, key agreement).
    let models: BTreeMap<String, ModelDescriptor> = snapshot
        .models
        .into_iter()
        .map(|(key, raw)| {
            let model = ModelDescriptor::decode(&key, raw, options, &mut errs);
            (key, model)
        })
        .collect();

    if !errs.is_empty() {
        debug!("decode phase reported violations; continuing to collect the rest");
    }

    // Phase 2: cross-node invariants.
    validate_registry(&models, &snapshot.index, options, &mut errs);

    if let Err(err) = errs.result() {
        warn!(
            violations = err.violations().len(),
            %fingerprint,
            "schema snapshot rejected: {err}"
        );
        return Err(err);
    }

    for model in models.values() {
        let protected = model.state_chart.system_states().count();
        if protected > 0 {
            debug!(
                model = %model.key,
                protected,
                "undeletable system states present"
            );
        }
    }

    let registry = Registry::assemble(models, snapshot.index, fingerprint, options.clone());
    info!(
        models = registry.len(),
        %fingerprint,
        elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        "schema registry loaded"
    );

    Ok(registry)
}
