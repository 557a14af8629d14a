//! Schema-wide validation passes, run after every model has been decoded.

mod enumeration;
mod index;
mod naming;
mod relation;
mod state;

use crate::{build::LoadOptions, error::Violations, node::ModelDescriptor};
use std::collections::BTreeMap;

/// Run every cross-node pass in a fixed order, collecting all violations.
pub(crate) fn validate_registry(
    models: &BTreeMap<String, ModelDescriptor>,
    index: &BTreeMap<String, String>,
    options: &LoadOptions,
    errs: &mut Violations,
) {
    // (a) index closure
    index::validate_index(models, index, errs);

    // (b) naming within and across models
    naming::validate_model_naming(models, errs);
    naming::validate_field_naming(models, errs);
    if options.require_system_fields {
        naming::validate_system_fields(models, &options.system_fields, errs);
    }

    // (c) + (d) relationship targets and inverse symmetry
    relation::validate_relationships(models, options.strict_inverses, errs);

    // (e) enum option tables
    enumeration::validate_enums(models, errs);

    // (f) state charts
    state::validate_state_charts(models, errs);
}
