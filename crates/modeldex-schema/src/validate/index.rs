use crate::{
    INDEX_SEPARATOR,
    error::{IntegrityRule, Violations},
    node::ModelDescriptor,
};
use std::collections::BTreeMap;

// Every entry resolves, names its model by qualified api identifier, and every
// model is indexed exactly once.
pub(super) fn validate_index(
    models: &BTreeMap<String, ModelDescriptor>,
    index: &BTreeMap<String, String>,
    errs: &mut Violations,
) {
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();

    for (identifier, model_key) in index {
        let route = format!("index.{identifier}");

        let Some(model) = models.get(model_key) else {
            errs.add(
                IntegrityRule::DanglingIndexEntry,
                route,
                model_key.as_str(),
                format!("index entry '{identifier}' points at missing model '{model_key}'"),
            );
            continue;
        };

        let Some((prefix, suffix)) = identifier.split_once(INDEX_SEPARATOR) else {
            errs.add(
                IntegrityRule::MalformedIndexIdentifier,
                route,
                identifier.as_str(),
                format!("index identifier '{identifier}' has no '{INDEX_SEPARATOR}' separator"),
            );
            continue;
        };
        if prefix.is_empty() || suffix.is_empty() {
            errs.add(
                IntegrityRule::MalformedIndexIdentifier,
                route,
                identifier.as_str(),
                format!("index identifier '{identifier}' needs a prefix and an identifier"),
            );
            continue;
        }

        let qualified = model.qualified_api_identifier();
        if suffix != qualified {
            errs.add(
                IntegrityRule::IndexIdentifierMismatch,
                route.clone(),
                model_key.as_str(),
                format!(
                    "index entry '{identifier}' names '{suffix}' but model '{model_key}' is '{qualified}'"
                ),
            );
        }

        if let Some(prev) = seen.insert(model_key, identifier) {
            errs.add(
                IntegrityRule::DuplicateIndexEntry,
                route,
                model_key.as_str(),
                format!("model '{model_key}' is indexed by both '{prev}' and '{identifier}'"),
            );
        }
    }

    for key in models.keys() {
        if !seen.contains_key(key.as_str()) {
            errs.add(
                IntegrityRule::MissingIndexEntry,
                key.as_str(),
                key.as_str(),
                format!("model '{key}' has no index entry"),
            );
        }
    }
}
