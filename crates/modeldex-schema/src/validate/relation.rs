use crate::{
    error::{IntegrityRule, Violations},
    node::{FieldDescriptor, ModelDescriptor},
    types::FieldType,
};
use std::collections::BTreeMap;
use tracing::debug;

// Validate every BelongsTo/HasMany edge: the target model exists, and a
// declared HasMany inverse is a BelongsTo on the target pointing back.
pub(super) fn validate_relationships(
    models: &BTreeMap<String, ModelDescriptor>,
    strict_inverses: bool,
    errs: &mut Violations,
) {
    for (model_key, model) in models {
        for field in model.relationship_fields() {
            let route = format!("{model_key}.fields.{}", field.key);

            // decode guarantees relationship configs carry a target
            let Some(target_key) = field.related_model_key() else {
                continue;
            };

            // Phase (c): the target resolves.
            let Some(target) = models.get(target_key) else {
                errs.add(
                    IntegrityRule::DanglingRelationship,
                    route,
                    target_key,
                    format!(
                        "field '{}' on '{model_key}' relates to missing model '{target_key}'",
                        field.key
                    ),
                );
                continue;
            };

            // Phase (d): inverse symmetry, HasMany only.
            if field.field_type != FieldType::HasMany {
                continue;
            }
            let Some(inverse_key) = field.inverse_field_key() else {
                continue;
            };

            if let Some((rule, message)) = check_inverse(model_key, field, target, inverse_key) {
                if strict_inverses {
                    errs.add(rule, route, inverse_key, message);
                } else {
                    debug!(model = %model_key, field = %field.key, %rule, "tolerated inverse: {message}");
                }
            }
        }
    }
}

fn check_inverse(
    owner_key: &str,
    field: &FieldDescriptor,
    target: &ModelDescriptor,
    inverse_key: &str,
) -> Option<(IntegrityRule, String)> {
    let Some(inverse) = target.field_by_key(inverse_key) else {
        return Some((
            IntegrityRule::InverseFieldMissing,
            format!(
                "inverse field '{inverse_key}' of '{}' does not exist on '{}'",
                field.key, target.key
            ),
        ));
    };

    if inverse.field_type != FieldType::BelongsTo {
        return Some((
            IntegrityRule::InverseFieldNotBelongsTo,
            format!(
                "inverse field '{inverse_key}' of '{}' is {}, expected BelongsTo",
                field.key, inverse.field_type
            ),
        ));
    }

    match inverse.related_model_key() {
        Some(back) if back == owner_key => None,
        back => Some((
            IntegrityRule::InverseFieldAsymmetric,
            format!(
                "inverse field '{inverse_key}' of '{}' points at '{}' instead of '{owner_key}'",
                field.key,
                back.unwrap_or("nothing")
            ),
        )),
    }
}
