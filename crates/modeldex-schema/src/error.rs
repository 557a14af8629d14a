use crate::types::FieldType;
use derive_more::Display;
use std::fmt;
use thiserror::Error as ThisError;

///
/// IntegrityRule
/// Load-time invariant a snapshot can violate.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum IntegrityRule {
    DanglingIndexEntry,
    DanglingInitialChildState,
    DanglingRelationship,
    DuplicateEnumOptionKey,
    DuplicateEnumOptionName,
    DuplicateFieldApiIdentifier,
    DuplicateGraphqlTypeName,
    DuplicateIndexEntry,
    DuplicateModelApiIdentifier,
    DuplicateStateKey,
    EmptyEnumOptions,
    IndexIdentifierMismatch,
    InvalidEnumDefault,
    InverseFieldAsymmetric,
    InverseFieldMissing,
    InverseFieldNotBelongsTo,
    KeyMismatch,
    MalformedConfiguration,
    MalformedIndexIdentifier,
    MisplacedBirthPlace,
    MissingBirthPlace,
    MissingIndexEntry,
    MissingSystemField,
    MultipleBirthPlaces,
    StateChartTooDeep,
    UnknownFieldType,
}

///
/// Violation
/// One broken invariant, with the route to the offending node.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Violation {
    pub rule: IntegrityRule,
    pub route: String,
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.route.is_empty() {
            write!(f, "[{}] {}", self.rule, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.rule, self.route, self.message)
        }
    }
}

///
/// Violations
/// Collects violations across validation phases, in discovery order.
///

#[derive(Debug, Default)]
pub(crate) struct Violations {
    list: Vec<Violation>,
}

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(
        &mut self,
        rule: IntegrityRule,
        route: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.list.push(Violation {
            rule,
            route: route.into(),
            subject: subject.into(),
            message: message.into(),
        });
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub(crate) fn result(self) -> Result<(), SchemaIntegrityError> {
        if self.list.is_empty() {
            Ok(())
        } else {
            Err(SchemaIntegrityError {
                violations: self.list,
            })
        }
    }
}

///
/// SchemaIntegrityError
///
/// Raised by a load that found at least one violation. No registry is
/// produced alongside it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaIntegrityError {
    violations: Vec<Violation>,
}

impl SchemaIntegrityError {
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Rules broken by this snapshot, deduplicated and sorted.
    #[must_use]
    pub fn rules(&self) -> Vec<IntegrityRule> {
        let mut rules: Vec<_> = self.violations.iter().map(|v| v.rule).collect();
        rules.sort_unstable();
        rules.dedup();

        rules
    }

    #[must_use]
    pub fn has_rule(&self, rule: IntegrityRule) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }

    /// True if any violation names `key` as its subject or in its message.
    #[must_use]
    pub fn mentions(&self, key: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.subject == key || v.message.contains(key))
    }
}

impl fmt::Display for SchemaIntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.violations.len();
        write!(f, "schema integrity check failed with {count} violation(s)")?;
        if let Some(first) = self.violations.first() {
            write!(f, "; first: {first}")?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaIntegrityError {}

///
/// NotFoundError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NotFoundError {
    #[error("model '{identifier}' not found")]
    Model { identifier: String },

    #[error("field '{identifier}' not found on model '{model}'")]
    Field { model: String, identifier: String },
}

impl NotFoundError {
    pub(crate) fn model(identifier: &str) -> Self {
        Self::Model {
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn field(model: &str, identifier: &str) -> Self {
        Self::Field {
            model: model.to_string(),
            identifier: identifier.to_string(),
        }
    }
}

///
/// BrokenRelationshipError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("relationship '{model}.{field}' is broken: {reason}")]
pub struct BrokenRelationshipError {
    pub model: String,
    pub field: String,
    pub reason: BrokenRelationshipReason,
}

///
/// BrokenRelationshipReason
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum BrokenRelationshipReason {
    #[display("model not found")]
    UnknownModel,

    #[display("field not found")]
    UnknownField,

    #[display("field type {_0} is not a relationship")]
    NotARelationship(FieldType),

    #[display("related model '{_0}' does not exist")]
    DanglingTarget(String),

    #[display("inverse field '{_0}' does not exist on the related model")]
    MissingInverse(String),

    #[display("inverse field '{field}' is a {field_type} field, expected BelongsTo")]
    InverseNotBelongsTo { field: String, field_type: FieldType },

    #[display("inverse field '{field}' points at '{target}' instead of the owning model")]
    InverseAsymmetric { field: String, target: String },

    #[display("{} HasMany fields claim this field as their inverse: {}", _0.len(), _0.join(", "))]
    AmbiguousInverse(Vec<String>),
}

///
/// InvalidEnumValueError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("invalid value for enum '{model}.{field}': {reason}")]
pub struct InvalidEnumValueError {
    pub model: String,
    pub field: String,
    pub reason: InvalidEnumReason,
}

///
/// InvalidEnumReason
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum InvalidEnumReason {
    #[display("unknown value(s) {values:?}; allowed: {allowed:?}")]
    UnknownValues {
        values: Vec<String>,
        allowed: Vec<String>,
    },

    #[display("expected exactly one value, found {found}")]
    ExpectedSingle { found: usize },

    #[display("field type {_0} is not an enum")]
    NotAnEnum(FieldType),
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collector_is_ok() {
        assert!(Violations::new().result().is_ok());
    }

    #[test]
    fn integrity_error_keeps_every_violation() {
        let mut errs = Violations::new();
        errs.add(
            IntegrityRule::DanglingIndexEntry,
            "index.api:ghost",
            "DataModel-Ghost",
            "index entry 'api:ghost' points at missing model 'DataModel-Ghost'",
        );
        errs.add(
            IntegrityRule::MissingBirthPlace,
            "DataModel-A.stateChart",
            "DataModel-A",
            "no top-level birth place state",
        );

        let err = errs.result().expect_err("violations must fail");
        assert_eq!(err.violations().len(), 2);
        assert!(err.mentions("DataModel-Ghost"));
        assert!(!err.mentions("DataModel-B"));
        assert_eq!(
            err.rules(),
            vec![
                IntegrityRule::DanglingIndexEntry,
                IntegrityRule::MissingBirthPlace
            ]
        );

        let rendered = err.to_string();
        assert!(rendered.contains("2 violation(s)"), "{rendered}");
        assert!(rendered.contains("[DanglingIndexEntry]"), "{rendered}");
    }

    #[test]
    fn relationship_reason_renders_candidates() {
        let err = BrokenRelationshipError {
            model: "DataModel-A".to_string(),
            field: "owner".to_string(),
            reason: BrokenRelationshipReason::AmbiguousInverse(vec![
                "F-1".to_string(),
                "F-2".to_string(),
            ]),
        };

        assert_eq!(
            err.to_string(),
            "relationship 'DataModel-A.owner' is broken: 2 HasMany fields claim this field as their inverse: F-1, F-2"
        );
    }
}
