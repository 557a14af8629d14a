use crate::{
    error::{IntegrityRule, Violations},
    node::{EnumConfig, FieldConfig},
    raw::RawField,
    types::FieldType,
};
use serde::Serialize;

///
/// FieldDescriptor
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub key: String,
    pub name: String,
    pub api_identifier: String,
    pub field_type: FieldType,
    pub internal_writable: bool,
    pub configuration: FieldConfig,
}

impl FieldDescriptor {
    // Decode one raw field; problems are recorded and the field is dropped.
    pub(crate) fn decode(
        map_key: &str,
        raw: RawField,
        route: &str,
        errs: &mut Violations,
    ) -> Option<Self> {
        if raw.key != map_key {
            errs.add(
                IntegrityRule::KeyMismatch,
                route,
                map_key,
                format!("field stored under '{map_key}' declares key '{}'", raw.key),
            );
        }

        let Some(field_type) = FieldType::parse(&raw.field_type) else {
            errs.add(
                IntegrityRule::UnknownFieldType,
                route,
                map_key,
                format!("unknown field type '{}'", raw.field_type),
            );
            return None;
        };

        let configuration = match FieldConfig::decode(field_type, &raw.configuration) {
            Ok(configuration) => configuration,
            Err(e) => {
                errs.add(IntegrityRule::MalformedConfiguration, route, map_key, e.to_string());
                return None;
            }
        };

        Some(Self {
            key: map_key.to_string(),
            name: raw.name,
            api_identifier: raw.api_identifier,
            field_type,
            internal_writable: raw.internal_writable,
            configuration,
        })
    }

    #[must_use]
    pub const fn is_relationship(&self) -> bool {
        self.field_type.is_relationship()
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        self.field_type.is_system()
    }

    #[must_use]
    pub fn related_model_key(&self) -> Option<&str> {
        self.configuration.related_model_key()
    }

    #[must_use]
    pub fn inverse_field_key(&self) -> Option<&str> {
        self.configuration.inverse_field_key()
    }

    #[must_use]
    pub const fn enum_config(&self) -> Option<&EnumConfig> {
        self.configuration.as_enum()
    }
}
