//! Schema registry for generated model metadata.
//!
//! A raw snapshot (models plus the external identifier index) is decoded and
//! validated exactly once by [`Registry::load`]. The result is immutable and
//! answers structural queries without further checks:
//!
//! - `build`: load options and the decode phase
//! - `node`: typed descriptors (models, fields, enum tables, state charts)
//! - `registry`: lookups, relationship resolution, enum validation, chart walks
//! - `handle`: atomic publication of replacement registries
//! - `evolution`: reports protected elements removed between two registries
#![warn(unreachable_pub)]

pub mod build;
pub mod error;
pub mod evolution;
pub mod handle;
pub mod node;
pub mod raw;
pub mod registry;
pub mod types;

mod validate;

#[cfg(test)]
pub(crate) mod test_fixtures;

use crate::{
    error::{BrokenRelationshipError, InvalidEnumValueError, NotFoundError, SchemaIntegrityError},
    raw::SnapshotError,
};
use thiserror::Error as ThisError;

pub use registry::Registry;

///
/// CONSTANTS
///

/// Default cap on state chart nesting; deeper subtrees fail the load.
pub const DEFAULT_MAX_STATE_DEPTH: usize = 32;

/// Field api identifiers every model carries unless configured otherwise.
pub const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Separator between the prefix and the qualified identifier of an index entry.
pub const INDEX_SEPARATOR: char = ':';

/// Prefix used by the generator for api index entries.
pub const API_INDEX_PREFIX: &str = "api";

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error,
        build::LoadOptions,
        handle::RegistryHandle,
        node::{
            EnumConfig, EnumOption, FieldConfig, FieldDescriptor, ModelDescriptor, State,
            StateChart,
        },
        raw::RawSnapshot,
        registry::{EnumInput, EnumVerdict, Registry, Relationship},
        types::FieldType,
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Integrity(#[from] SchemaIntegrityError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    BrokenRelationship(#[from] BrokenRelationshipError),

    #[error(transparent)]
    InvalidEnumValue(#[from] InvalidEnumValueError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
