use crate::{
    error::{IntegrityRule, Violations},
    node::ModelDescriptor,
};
use std::collections::BTreeMap;

pub(super) fn validate_model_naming(
    models: &BTreeMap<String, ModelDescriptor>,
    errs: &mut Violations,
) {
    let mut by_api: BTreeMap<&str, &str> = BTreeMap::new();
    let mut by_graphql: BTreeMap<&str, &str> = BTreeMap::new();

    // api identifiers are global; the namespace does not disambiguate them
    for (key, model) in models {
        let api = model.api_identifier.as_str();
        if let Some(prev) = by_api.insert(api, key) {
            errs.add(
                IntegrityRule::DuplicateModelApiIdentifier,
                key.as_str(),
                key.as_str(),
                format!("duplicate model api identifier '{api}' for '{prev}' and '{key}'"),
            );
        }

        let graphql = model.graphql_type_name.as_str();
        if graphql.is_empty() {
            continue;
        }
        if let Some(prev) = by_graphql.insert(graphql, key) {
            errs.add(
                IntegrityRule::DuplicateGraphqlTypeName,
                key.as_str(),
                key.as_str(),
                format!("duplicate GraphQL type name '{graphql}' for '{prev}' and '{key}'"),
            );
        }
    }
}

pub(super) fn validate_field_naming(
    models: &BTreeMap<String, ModelDescriptor>,
    errs: &mut Violations,
) {
    for (model_key, model) in models {
        let mut by_api: BTreeMap<&str, &str> = BTreeMap::new();

        for field in model.fields() {
            let api = field.api_identifier.as_str();
            if let Some(prev) = by_api.insert(api, &field.key) {
                errs.add(
                    IntegrityRule::DuplicateFieldApiIdentifier,
                    format!("{model_key}.fields.{}", field.key),
                    field.key.as_str(),
                    format!(
                        "duplicate field api identifier '{api}' on '{model_key}' for '{prev}' and '{}'",
                        field.key
                    ),
                );
            }
        }
    }
}

pub(super) fn validate_system_fields(
    models: &BTreeMap<String, ModelDescriptor>,
    system_fields: &[String],
    errs: &mut Violations,
) {
    for (model_key, model) in models {
        for name in system_fields {
            if model.field_by_api(name).is_none() {
                errs.add(
                    IntegrityRule::MissingSystemField,
                    format!("{model_key}.fields"),
                    model_key.as_str(),
                    format!("model '{model_key}' is missing system field '{name}'"),
                );
            }
        }
    }
}
