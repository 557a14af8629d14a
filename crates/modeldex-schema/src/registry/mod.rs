//! The loaded, validated and immutable schema.

mod enum_input;

pub use enum_input::{EnumInput, EnumVerdict};

use crate::{
    API_INDEX_PREFIX, INDEX_SEPARATOR,
    build::{LoadOptions, build_registry},
    error::{
        BrokenRelationshipError, BrokenRelationshipReason, InvalidEnumReason,
        InvalidEnumValueError, NotFoundError, SchemaIntegrityError,
    },
    node::{FieldDescriptor, ModelDescriptor, StateWalk},
    raw::{Fingerprint, RawModel, RawSnapshot},
    types::FieldType,
};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

///
/// Registry
///
/// Every model of one snapshot, with O(1) indexes for each accepted way of
/// naming a model. Built only by a successful load; there is no way to
/// mutate it afterwards, so it can be shared freely between threads.
///

#[derive(Debug)]
pub struct Registry {
    models: HashMap<String, ModelDescriptor>,
    order: Vec<String>,
    index: HashMap<String, String>,
    by_api: HashMap<String, String>,
    by_graphql: HashMap<String, String>,

    // (BelongsTo owner, field key) -> HasMany fields naming it as inverse
    inverses: HashMap<(String, String), Vec<(String, String)>>,

    fingerprint: Fingerprint,
    options: LoadOptions,
}

impl Registry {
    /// Load and validate a snapshot given as its two raw maps.
    pub fn load(
        models: BTreeMap<String, RawModel>,
        index: BTreeMap<String, String>,
        options: &LoadOptions,
    ) -> Result<Self, SchemaIntegrityError> {
        Self::from_snapshot(RawSnapshot { models, index }, options)
    }

    pub fn from_snapshot(
        snapshot: RawSnapshot,
        options: &LoadOptions,
    ) -> Result<Self, SchemaIntegrityError> {
        build_registry(snapshot, options)
    }

    // only called once validation has passed
    pub(crate) fn assemble(
        models: BTreeMap<String, ModelDescriptor>,
        index: BTreeMap<String, String>,
        fingerprint: Fingerprint,
        options: LoadOptions,
    ) -> Self {
        let order: Vec<String> = models.keys().cloned().collect();

        let mut by_api = HashMap::with_capacity(models.len());
        let mut by_graphql = HashMap::with_capacity(models.len());
        let mut inverses: HashMap<(String, String), Vec<(String, String)>> = HashMap::new();

        for (key, model) in &models {
            by_api.insert(model.qualified_api_identifier(), key.clone());
            if !model.graphql_type_name.is_empty() {
                by_graphql.insert(model.graphql_type_name.clone(), key.clone());
            }

            for field in model.relationship_fields() {
                if let (Some(target), Some(inverse)) =
                    (field.related_model_key(), field.inverse_field_key())
                {
                    inverses
                        .entry((target.to_string(), inverse.to_string()))
                        .or_default()
                        .push((key.clone(), field.key.clone()));
                }
            }
        }

        Self {
            models: models.into_iter().collect(),
            order,
            index: index.into_iter().collect(),
            by_api,
            by_graphql,
            inverses,
            fingerprint,
            options,
        }
    }

    ///
    /// LOOKUPS
    ///

    /// Resolve a model by index identifier, internal key, qualified api
    /// identifier or GraphQL type name, in that order.
    pub fn get_model(&self, identifier: &str) -> Result<&ModelDescriptor, NotFoundError> {
        self.find_model(identifier)
            .ok_or_else(|| NotFoundError::model(identifier))
    }

    fn find_model(&self, identifier: &str) -> Option<&ModelDescriptor> {
        if let Some(key) = self.index.get(identifier) {
            return self.models.get(key);
        }
        if let Some(model) = self.models.get(identifier) {
            return Some(model);
        }
        if let Some(key) = self.by_api.get(identifier) {
            return self.models.get(key);
        }

        // an unregistered prefix still names a model by its qualified identifier
        if let Some((prefix, rest)) = identifier.split_once(INDEX_SEPARATOR)
            && prefix == API_INDEX_PREFIX
            && let Some(key) = self.by_api.get(rest)
        {
            return self.models.get(key);
        }

        self.by_graphql
            .get(identifier)
            .and_then(|key| self.models.get(key))
    }

    /// Resolve a field of `model` by api identifier, falling back to its key.
    pub fn get_field(
        &self,
        model: &str,
        api_identifier: &str,
    ) -> Result<&FieldDescriptor, NotFoundError> {
        let descriptor = self.get_model(model)?;

        descriptor
            .field_by_api(api_identifier)
            .or_else(|| descriptor.field_by_key(api_identifier))
            .ok_or_else(|| NotFoundError::field(&descriptor.key, api_identifier))
    }

    /// Resolve a field of `model` by its internal key only.
    pub fn field_by_key(&self, model: &str, key: &str) -> Result<&FieldDescriptor, NotFoundError> {
        let descriptor = self.get_model(model)?;

        descriptor
            .field_by_key(key)
            .ok_or_else(|| NotFoundError::field(&descriptor.key, key))
    }

    ///
    /// RELATIONSHIPS
    ///

    /// Follow a BelongsTo or HasMany field to its related model and, when one
    /// is declared, the field on the other end.
    pub fn resolve_relationship(
        &self,
        model: &str,
        field: &str,
    ) -> Result<Relationship<'_>, BrokenRelationshipError> {
        let broken = |reason| BrokenRelationshipError {
            model: model.to_string(),
            field: field.to_string(),
            reason,
        };

        let owner = self
            .find_model(model)
            .ok_or_else(|| broken(BrokenRelationshipReason::UnknownModel))?;
        let descriptor = owner
            .field(field)
            .ok_or_else(|| broken(BrokenRelationshipReason::UnknownField))?;

        let broken = |reason| BrokenRelationshipError {
            model: owner.key.clone(),
            field: descriptor.key.clone(),
            reason,
        };

        let kind = descriptor.field_type;
        let Some(target_key) = descriptor.related_model_key() else {
            return Err(broken(BrokenRelationshipReason::NotARelationship(kind)));
        };
        let related_model = self
            .models
            .get(target_key)
            .ok_or_else(|| broken(BrokenRelationshipReason::DanglingTarget(target_key.to_string())))?;

        let inverse_field = match kind {
            FieldType::HasMany => descriptor
                .inverse_field_key()
                .map(|inverse_key| Self::has_many_inverse(owner, related_model, inverse_key))
                .transpose()
                .map_err(broken)?,
            _ => self
                .belongs_to_inverse(owner, descriptor, related_model)
                .map_err(broken)?,
        };

        Ok(Relationship {
            model: owner,
            field: descriptor,
            related_model,
            inverse_field,
            kind,
        })
    }

    // The declared inverse must be a BelongsTo on the target pointing back.
    fn has_many_inverse<'a>(
        owner: &ModelDescriptor,
        target: &'a ModelDescriptor,
        inverse_key: &str,
    ) -> Result<&'a FieldDescriptor, BrokenRelationshipReason> {
        let inverse = target
            .field_by_key(inverse_key)
            .ok_or_else(|| BrokenRelationshipReason::MissingInverse(inverse_key.to_string()))?;

        if inverse.field_type != FieldType::BelongsTo {
            return Err(BrokenRelationshipReason::InverseNotBelongsTo {
                field: inverse.key.clone(),
                field_type: inverse.field_type,
            });
        }

        match inverse.related_model_key() {
            Some(back) if back == owner.key => Ok(inverse),
            back => Err(BrokenRelationshipReason::InverseAsymmetric {
                field: inverse.key.clone(),
                target: back.unwrap_or_default().to_string(),
            }),
        }
    }

    // The HasMany on the target that names this BelongsTo as its inverse.
    fn belongs_to_inverse<'a>(
        &'a self,
        owner: &ModelDescriptor,
        field: &FieldDescriptor,
        target: &'a ModelDescriptor,
    ) -> Result<Option<&'a FieldDescriptor>, BrokenRelationshipReason> {
        let Some(claims) = self
            .inverses
            .get(&(owner.key.clone(), field.key.clone()))
        else {
            return Ok(None);
        };

        let candidates: Vec<&(String, String)> = claims
            .iter()
            .filter(|(model_key, _)| *model_key == target.key)
            .collect();

        match candidates.as_slice() {
            [] => Ok(None),
            [(_, field_key)] => Ok(target.field_by_key(field_key)),
            many => Err(BrokenRelationshipReason::AmbiguousInverse(
                many.iter().map(|(_, key)| key.clone()).collect(),
            )),
        }
    }

    ///
    /// ENUMS
    ///

    /// Check candidate value(s) against an enum field's option table.
    pub fn validate_enum_value<'v>(
        &self,
        model: &str,
        field: &str,
        candidate: impl Into<EnumInput<'v>>,
    ) -> Result<EnumVerdict, crate::Error> {
        let owner = self.get_model(model)?;
        let descriptor = owner
            .field(field)
            .ok_or_else(|| NotFoundError::field(&owner.key, field))?;

        let invalid = |reason| InvalidEnumValueError {
            model: owner.key.clone(),
            field: descriptor.key.clone(),
            reason,
        };

        let Some(config) = descriptor.enum_config() else {
            return Err(invalid(InvalidEnumReason::NotAnEnum(descriptor.field_type)).into());
        };

        let candidate = candidate.into();
        if !config.allow_multiple && candidate.len() != 1 {
            return Err(invalid(InvalidEnumReason::ExpectedSingle {
                found: candidate.len(),
            })
            .into());
        }

        let verdict = EnumVerdict::select(candidate.values(), &config.options);
        if verdict.is_canonical() {
            return Ok(verdict);
        }

        if config.allow_other {
            debug!(
                model = %owner.key,
                field = %descriptor.key,
                values = ?verdict.non_canonical(),
                "non-canonical enum value(s) accepted"
            );
            return Ok(verdict);
        }

        Err(invalid(InvalidEnumReason::UnknownValues {
            values: verdict.non_canonical().to_vec(),
            allowed: config.options.names().map(ToString::to_string).collect(),
        })
        .into())
    }

    ///
    /// STATE CHARTS
    ///

    /// Lazy pre-order walk over a model's state chart.
    pub fn walk_state_chart(&self, model: &str) -> Result<StateWalk<'_>, NotFoundError> {
        Ok(self.get_model(model)?.state_chart.walk())
    }

    ///
    /// INTROSPECTION
    ///

    /// Every model, sorted by key.
    pub fn models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.order.iter().filter_map(|key| self.models.get(key))
    }

    /// Index entries sorted by identifier.
    #[must_use]
    pub fn index_entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .index
            .iter()
            .map(|(id, key)| (id.as_str(), key.as_str()))
            .collect();
        entries.sort_unstable();

        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    #[must_use]
    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    #[must_use]
    pub const fn options(&self) -> &LoadOptions {
        &self.options
    }
}

///
/// Relationship
/// A resolved edge, borrowed from the registry.
///

#[derive(Clone, Copy, Debug)]
pub struct Relationship<'a> {
    pub model: &'a ModelDescriptor,
    pub field: &'a FieldDescriptor,
    pub related_model: &'a ModelDescriptor,
    pub inverse_field: Option<&'a FieldDescriptor>,
    pub kind: FieldType,
}

impl Relationship<'_> {
    #[must_use]
    pub const fn is_bidirectional(&self) -> bool {
        self.inverse_field.is_some()
    }
}
