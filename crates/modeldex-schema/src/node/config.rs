use crate::{node::EnumOptionTable, types::FieldType};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error as ThisError;

/// Keys every configuration block may carry regardless of its variant.
pub const CONFIG_ENVELOPE_KEYS: &[&str] = &["type", "key", "createdDate"];

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("configuration has no 'type' tag")]
    MissingTag,

    #[error(
        "configuration type '{found}' does not match field type {field_type} (expected '{}')",
        .field_type.config_tag()
    )]
    TagMismatch {
        field_type: FieldType,
        found: String,
    },

    #[error("invalid {tag} payload: {source}")]
    Payload {
        tag: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

///
/// FieldConfig
///
/// Type-specific configuration of a field. The variant always agrees with the
/// field's [`FieldType`]; keys that belong to another variant are rejected
/// during decode.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum FieldConfig {
    #[serde(rename = "BelongsToConfig")]
    BelongsTo(BelongsToConfig),

    #[serde(rename = "BooleanConfig")]
    Boolean(BooleanConfig),

    #[serde(rename = "DateTimeConfig")]
    DateTime(DateTimeConfig),

    #[serde(rename = "EncryptedStringConfig")]
    EncryptedString(TextConfig),

    #[serde(rename = "EnumConfig")]
    Enum(EnumConfig),

    #[serde(rename = "HasManyConfig")]
    HasMany(HasManyConfig),

    #[serde(rename = "IDConfig")]
    Id,

    #[serde(rename = "JSONConfig")]
    Json(JsonConfig),

    #[serde(rename = "NumberConfig")]
    Number(NumberConfig),

    #[serde(rename = "RecordStateConfig")]
    RecordState,

    #[serde(rename = "RoleAssignmentsConfig")]
    RoleAssignments(RoleAssignmentsConfig),

    #[serde(rename = "StringConfig")]
    String(TextConfig),

    #[serde(rename = "URLConfig")]
    Url(TextConfig),
}

impl FieldConfig {
    /// Decode a raw configuration object for a field of type `field_type`.
    pub fn decode(field_type: FieldType, raw: &Map<String, Value>) -> Result<Self, ConfigError> {
        let tag = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ConfigError::MissingTag)?;

        if tag != field_type.config_tag() {
            return Err(ConfigError::TagMismatch {
                field_type,
                found: tag.to_string(),
            });
        }

        let payload: Map<String, Value> = raw
            .iter()
            .filter(|(k, _)| !CONFIG_ENVELOPE_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let tag = field_type.config_tag();

        let config = match field_type {
            FieldType::BelongsTo => Self::BelongsTo(payload_as(tag, payload)?),
            FieldType::Boolean => Self::Boolean(payload_as(tag, payload)?),
            FieldType::DateTime => Self::DateTime(payload_as(tag, payload)?),
            FieldType::EncryptedString => Self::EncryptedString(payload_as(tag, payload)?),
            FieldType::Enum => Self::Enum(payload_as(tag, payload)?),
            FieldType::HasMany => Self::HasMany(payload_as(tag, payload)?),
            FieldType::Id => {
                payload_as::<Empty>(tag, payload)?;
                Self::Id
            }
            FieldType::Json => Self::Json(payload_as(tag, payload)?),
            FieldType::Number => Self::Number(payload_as(tag, payload)?),
            FieldType::RecordState => {
                payload_as::<Empty>(tag, payload)?;
                Self::RecordState
            }
            FieldType::RoleAssignments => Self::RoleAssignments(payload_as(tag, payload)?),
            FieldType::String => Self::String(payload_as(tag, payload)?),
            FieldType::Url => Self::Url(payload_as(tag, payload)?),
        };

        Ok(config)
    }

    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::BelongsTo(_) => FieldType::BelongsTo,
            Self::Boolean(_) => FieldType::Boolean,
            Self::DateTime(_) => FieldType::DateTime,
            Self::EncryptedString(_) => FieldType::EncryptedString,
            Self::Enum(_) => FieldType::Enum,
            Self::HasMany(_) => FieldType::HasMany,
            Self::Id => FieldType::Id,
            Self::Json(_) => FieldType::Json,
            Self::Number(_) => FieldType::Number,
            Self::RecordState => FieldType::RecordState,
            Self::RoleAssignments(_) => FieldType::RoleAssignments,
            Self::String(_) => FieldType::String,
            Self::Url(_) => FieldType::Url,
        }
    }

    #[must_use]
    pub fn related_model_key(&self) -> Option<&str> {
        match self {
            Self::BelongsTo(c) => Some(&c.related_model_key),
            Self::HasMany(c) => Some(&c.related_model_key),
            _ => None,
        }
    }

    #[must_use]
    pub fn inverse_field_key(&self) -> Option<&str> {
        match self {
            Self::HasMany(c) => c.inverse_field_key.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_enum(&self) -> Option<&EnumConfig> {
        match self {
            Self::Enum(c) => Some(c),
            _ => None,
        }
    }
}

fn payload_as<T: DeserializeOwned>(
    tag: &'static str,
    payload: Map<String, Value>,
) -> Result<T, ConfigError> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|source| ConfigError::Payload { tag, source })
}

// ID and RecordState configurations carry nothing beyond the envelope.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Empty {}

///
/// TextConfig
/// String, URL and EncryptedString fields.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TextConfig {
    pub default: Option<String>,
}

///
/// BooleanConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct BooleanConfig {
    pub default: Option<bool>,
}

///
/// DateTimeConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DateTimeConfig {
    pub default: Option<String>,
    pub include_time: bool,
}

impl Default for DateTimeConfig {
    fn default() -> Self {
        Self {
            default: None,
            include_time: true,
        }
    }
}

///
/// NumberConfig
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct NumberConfig {
    pub default: Option<f64>,
    pub decimals: Option<u32>,
}

///
/// JsonConfig
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct JsonConfig {
    pub default: Option<Value>,
}

///
/// EnumConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EnumConfig {
    #[serde(default)]
    pub allow_multiple: bool,

    #[serde(default)]
    pub allow_other: bool,

    #[serde(default)]
    pub options: EnumOptionTable,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<EnumDefault>,
}

impl PartialEq for EnumConfig {
    fn eq(&self, other: &Self) -> bool {
        self.allow_multiple == other.allow_multiple
            && self.allow_other == other.allow_other
            && self.options.options() == other.options.options()
            && self.default == other.default
    }
}

///
/// EnumDefault
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnumDefault {
    One(String),
    Many(Vec<String>),
}

impl EnumDefault {
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

///
/// BelongsToConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BelongsToConfig {
    pub related_model_key: String,
}

///
/// HasManyConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct HasManyConfig {
    pub related_model_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_field_key: Option<String>,
}

///
/// RoleAssignmentsConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct RoleAssignmentsConfig {
    pub default: Vec<String>,
}

///
/// TESTS
///
