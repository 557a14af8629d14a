//! Differences between two loaded registries that touch protected elements.
//!
//! Nothing here is enforced. A reload reports what the new snapshot dropped
//! so operators can see it; accepting the snapshot is still a separate step.

use crate::{node::ModelDescriptor, registry::Registry, types::FieldType};
use derive_more::Display;
use serde::Serialize;

///
/// Finding
///

#[derive(Clone, Debug, Display, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[remain::sorted]
pub enum Finding {
    #[display("enum option '{option}' removed from {model}.{field}")]
    EnumOptionRemoved {
        model: String,
        field: String,
        option: String,
    },

    #[display("field {model}.{field} removed")]
    FieldRemoved { model: String, field: String },

    #[display("field {model}.{field} changed type from {from} to {to}")]
    FieldTypeChanged {
        model: String,
        field: String,
        from: FieldType,
        to: FieldType,
    },

    #[display("model {model} removed")]
    ModelRemoved { model: String },

    #[display("undeletable state '{state}' removed from {model}")]
    ProtectedStateRemoved { model: String, state: String },

    #[display("system field {model}.{field} ({field_type}) removed")]
    SystemFieldRemoved {
        model: String,
        field: String,
        field_type: FieldType,
    },
}

impl Finding {
    /// Removal of an ID/RecordState field or an undeletable state.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::ProtectedStateRemoved { .. } | Self::SystemFieldRemoved { .. }
        )
    }
}

///
/// EvolutionReport
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EvolutionReport {
    findings: Vec<Finding>,
}

impl EvolutionReport {
    /// Compare `old` against its replacement `new`.
    #[must_use]
    pub fn between(old: &Registry, new: &Registry) -> Self {
        let mut findings = Vec::new();

        for before in old.models() {
            let Ok(after) = new.get_model(&before.key) else {
                findings.push(Finding::ModelRemoved {
                    model: before.key.clone(),
                });
                continue;
            };

            compare_fields(before, after, &mut findings);
            compare_states(before, after, &mut findings);
        }

        findings.sort();

        Self { findings }
    }

    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    #[must_use]
    pub fn has_protected_removals(&self) -> bool {
        self.findings.iter().any(Finding::is_protected)
    }
}

fn compare_fields(before: &ModelDescriptor, after: &ModelDescriptor, out: &mut Vec<Finding>) {
    for field in before.fields() {
        let Some(now) = after.field_by_key(&field.key) else {
            if field.is_system() {
                out.push(Finding::SystemFieldRemoved {
                    model: before.key.clone(),
                    field: field.key.clone(),
                    field_type: field.field_type,
                });
            } else {
                out.push(Finding::FieldRemoved {
                    model: before.key.clone(),
                    field: field.key.clone(),
                });
            }
            continue;
        };

        if now.field_type != field.field_type {
            out.push(Finding::FieldTypeChanged {
                model: before.key.clone(),
                field: field.key.clone(),
                from: field.field_type,
                to: now.field_type,
            });
            continue;
        }

        let (Some(was), Some(is)) = (field.enum_config(), now.enum_config()) else {
            continue;
        };
        for option in was.options.names().filter(|name| !is.options.contains(name)) {
            out.push(Finding::EnumOptionRemoved {
                model: before.key.clone(),
                field: field.key.clone(),
                option: option.to_string(),
            });
        }
    }
}

fn compare_states(before: &ModelDescriptor, after: &ModelDescriptor, out: &mut Vec<Finding>) {
    for state in before.state_chart.system_states() {
        if after.state_chart.get(&state.key).is_none() {
            out.push(Finding::ProtectedStateRemoved {
                model: before.key.clone(),
                state: state.key.clone(),
            });
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{self, config_mut, model_mut};
    use serde_json::json;

    const ORDER: &str = "DataModel-Shopify-Order";

    #[test]
    fn identical_registries_have_no_findings() {
        let report = EvolutionReport::between(&test_fixtures::registry(), &test_fixtures::registry());

        assert!(report.is_empty());
        assert!(!report.has_protected_removals());
    }

    #[test]
    fn removals_and_type_changes_are_listed() {
        let old = test_fixtures::registry();

        let mut snapshot = test_fixtures::snapshot();
        let order = model_mut(&mut snapshot, ORDER);
        order.fields.remove("ModelField-Order-State");
        order.fields.remove("ModelField-Order-NoteAttributes");
        order.state_chart.child_states.pop();
        let test = order
            .fields
            .get_mut("ModelField-Order-Test")
            .expect("test field");
        test.field_type = "String".to_string();
        test.configuration = serde_json::Map::from_iter([("type".to_string(), json!("StringConfig"))]);
        config_mut(&mut snapshot, ORDER, "ModelField-Order-Channels").insert(
            "options".into(),
            json!([
                { "key": "Option-Order-Channels-Online", "name": "ONLINE" },
                { "key": "Option-Order-Channels-Wholesale", "name": "WHOLESALE" },
            ]),
        );
        let new = test_fixtures::load(snapshot).expect("still valid");

        let report = EvolutionReport::between(&old, &new);
        let rendered: Vec<_> = report.findings().iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec![
                "enum option 'POS' removed from DataModel-Shopify-Order.ModelField-Order-Channels",
                "field DataModel-Shopify-Order.ModelField-Order-NoteAttributes removed",
                "field DataModel-Shopify-Order.ModelField-Order-Test changed type from Boolean to String",
                "undeletable state 'State-Order-Deleted' removed from DataModel-Shopify-Order",
                "system field DataModel-Shopify-Order.ModelField-Order-State (RecordState) removed",
            ]
        );
        assert!(report.has_protected_removals());
    }

    #[test]
    fn dropped_models_are_reported() {
        let old = test_fixtures::registry();

        let mut snapshot = test_fixtures::snapshot();
        snapshot.models.remove("DataModel-Internal-AuditEvent");
        snapshot.index.remove("api:internal.auditEvent");
        config_mut(&mut snapshot, "DataModel-Session", "ModelField-Session-AuditEvents")
            .insert("relatedModelKey".into(), json!(ORDER));
        let new = test_fixtures::load(snapshot).expect("still valid");

        let report = EvolutionReport::between(&old, &new);
        assert_eq!(
            report.findings(),
            [Finding::ModelRemoved {
                model: "DataModel-Internal-AuditEvent".to_string()
            }]
        );
        assert!(!report.has_protected_removals());
    }
}
