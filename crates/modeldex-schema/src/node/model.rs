use crate::{
    build::LoadOptions,
    error::{IntegrityRule, Violations},
    node::{FieldDescriptor, StateChart},
    raw::RawModel,
};
use serde::Serialize;
use std::collections::HashMap;

///
/// ModelDescriptor
///
/// One entity type. Fields are kept in key order with two O(1) indexes: by
/// internal key (the snapshot's own keying) and by api identifier (derived
/// here, since callers address fields by their external name).
///

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub key: String,
    pub name: String,
    pub api_identifier: String,
    pub namespace: Vec<String>,
    pub graphql_type_name: String,
    fields: Vec<FieldDescriptor>,
    pub state_chart: StateChart,

    #[serde(skip)]
    by_key: HashMap<String, usize>,

    #[serde(skip)]
    by_api: HashMap<String, usize>,
}

impl ModelDescriptor {
    pub(crate) fn decode(
        map_key: &str,
        raw: RawModel,
        options: &LoadOptions,
        errs: &mut Violations,
    ) -> Self {
        if raw.key != map_key {
            errs.add(
                IntegrityRule::KeyMismatch,
                map_key,
                map_key,
                format!("model stored under '{map_key}' declares key '{}'", raw.key),
            );
        }

        let fields: Vec<_> = raw
            .fields
            .into_iter()
            .filter_map(|(field_key, field)| {
                let route = format!("{map_key}.fields.{field_key}");
                FieldDescriptor::decode(&field_key, field, &route, errs)
            })
            .collect();

        let mut by_key = HashMap::with_capacity(fields.len());
        let mut by_api = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            by_key.insert(field.key.clone(), i);
            by_api.entry(field.api_identifier.clone()).or_insert(i);
        }

        let state_chart = StateChart::build(
            raw.state_chart,
            options.max_state_depth,
            &format!("{map_key}.stateChart"),
            errs,
        );

        Self {
            key: map_key.to_string(),
            name: raw.name,
            api_identifier: raw.api_identifier,
            namespace: raw.namespace.segments(),
            graphql_type_name: raw.graphql_type_name,
            fields,
            state_chart,
            by_key,
            by_api,
        }
    }

    /// Namespace segments and api identifier joined with `.`.
    #[must_use]
    pub fn qualified_api_identifier(&self) -> String {
        if self.namespace.is_empty() {
            return self.api_identifier.clone();
        }

        let mut out = self.namespace.join(".");
        out.push('.');
        out.push_str(&self.api_identifier);

        out
    }

    /// Fields in key order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn field_by_key(&self, key: &str) -> Option<&FieldDescriptor> {
        self.by_key.get(key).map(|&i| &self.fields[i])
    }

    #[must_use]
    pub fn field_by_api(&self, api_identifier: &str) -> Option<&FieldDescriptor> {
        self.by_api.get(api_identifier).map(|&i| &self.fields[i])
    }

    /// Resolve a field by internal key first, then by api identifier.
    #[must_use]
    pub fn field(&self, key_or_api: &str) -> Option<&FieldDescriptor> {
        self.field_by_key(key_or_api)
            .or_else(|| self.field_by_api(key_or_api))
    }

    pub fn relationship_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_relationship())
    }

    pub fn enum_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.enum_config().is_some())
    }

    pub fn system_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_system())
    }
}
