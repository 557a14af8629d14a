use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// FieldType
/// Closed tag set for model attributes.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum FieldType {
    BelongsTo,
    Boolean,
    DateTime,
    EncryptedString,
    Enum,
    HasMany,
    #[display("ID")]
    #[serde(rename = "ID")]
    Id,
    #[display("JSON")]
    #[serde(rename = "JSON")]
    Json,
    Number,
    RecordState,
    RoleAssignments,
    String,
    #[display("URL")]
    #[serde(rename = "URL")]
    Url,
}

impl FieldType {
    /// Parse the wire tag used in snapshots (`"ID"`, `"BelongsTo"`, ...).
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let ty = match tag {
            "BelongsTo" => Self::BelongsTo,
            "Boolean" => Self::Boolean,
            "DateTime" => Self::DateTime,
            "EncryptedString" => Self::EncryptedString,
            "Enum" => Self::Enum,
            "HasMany" => Self::HasMany,
            "ID" => Self::Id,
            "JSON" => Self::Json,
            "Number" => Self::Number,
            "RecordState" => Self::RecordState,
            "RoleAssignments" => Self::RoleAssignments,
            "String" => Self::String,
            "URL" => Self::Url,
            _ => return None,
        };

        Some(ty)
    }

    /// The `configuration.type` tag a field of this type must carry.
    #[must_use]
    pub const fn config_tag(self) -> &'static str {
        match self {
            Self::BelongsTo => "BelongsToConfig",
            Self::Boolean => "BooleanConfig",
            Self::DateTime => "DateTimeConfig",
            Self::EncryptedString => "EncryptedStringConfig",
            Self::Enum => "EnumConfig",
            Self::HasMany => "HasManyConfig",
            Self::Id => "IDConfig",
            Self::Json => "JSONConfig",
            Self::Number => "NumberConfig",
            Self::RecordState => "RecordStateConfig",
            Self::RoleAssignments => "RoleAssignmentsConfig",
            Self::String => "StringConfig",
            Self::Url => "URLConfig",
        }
    }

    #[must_use]
    pub const fn is_relationship(self) -> bool {
        matches!(self, Self::BelongsTo | Self::HasMany)
    }

    // structural fields that schema authors must not remove once established
    #[must_use]
    pub const fn is_system(self) -> bool {
        matches!(self, Self::Id | Self::RecordState)
    }
}

///
/// TESTS
///
