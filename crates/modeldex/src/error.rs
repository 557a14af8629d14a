use crate::config::ConfigError;
use derive_more::Display;
use modeldex_schema::{
    error::{BrokenRelationshipError, InvalidEnumValueError, NotFoundError, SchemaIntegrityError},
    raw::SnapshotError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Load-time failures; no registry exists to fall back on.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Integrity | ErrorKind::Snapshot | ErrorKind::Config | ErrorKind::Io
        )
    }
}

impl From<modeldex_schema::Error> for Error {
    fn from(err: modeldex_schema::Error) -> Self {
        use modeldex_schema::Error as E;

        match err {
            E::Integrity(err) => err.into(),
            E::NotFound(err) => err.into(),
            E::BrokenRelationship(err) => err.into(),
            E::InvalidEnumValue(err) => err.into(),
            E::Snapshot(err) => err.into(),
        }
    }
}

impl From<SchemaIntegrityError> for Error {
    fn from(err: SchemaIntegrityError) -> Self {
        let message = err
            .violations()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        Self::new(
            ErrorKind::Integrity,
            ErrorOrigin::Load,
            format!("{err}\n{message}"),
        )
    }
}

impl From<NotFoundError> for Error {
    fn from(err: NotFoundError) -> Self {
        Self::new(ErrorKind::NotFound, ErrorOrigin::Lookup, err.to_string())
    }
}

impl From<BrokenRelationshipError> for Error {
    fn from(err: BrokenRelationshipError) -> Self {
        Self::new(
            ErrorKind::BrokenRelationship,
            ErrorOrigin::Lookup,
            err.to_string(),
        )
    }
}

impl From<InvalidEnumValueError> for Error {
    fn from(err: InvalidEnumValueError) -> Self {
        Self::new(
            ErrorKind::InvalidEnumValue,
            ErrorOrigin::Lookup,
            err.to_string(),
        )
    }
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        let kind = match err {
            SnapshotError::Io { .. } => ErrorKind::Io,
            SnapshotError::Json(_) => ErrorKind::Snapshot,
        };

        Self::new(kind, ErrorOrigin::Snapshot, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::Read { .. } => ErrorKind::Io,
            ConfigError::Parse { .. } | ConfigError::MissingSnapshot => ErrorKind::Config,
        };

        Self::new(kind, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The snapshot broke at least one load-time invariant.
    Integrity,

    /// Unknown model or field identifier.
    NotFound,

    /// A relationship field whose other end is inconsistent.
    BrokenRelationship,

    /// Candidate value(s) outside a closed enum.
    InvalidEnumValue,

    /// The snapshot could not be decoded.
    Snapshot,

    Config,
    Io,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Load,
    Lookup,
    Snapshot,
}

///
/// TESTS
///
