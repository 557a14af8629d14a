//! Serialized snapshot shape, exactly as the metadata generator emits it.
//!
//! Nothing here is validated. Model and field records are kept loose so a
//! load can report every problem at once; field configurations stay as JSON
//! objects until the decode phase turns them into [`FieldConfig`].
//!
//! [`FieldConfig`]: crate::node::FieldConfig

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, fmt, fs, io, path::Path};
use thiserror::Error as ThisError;

///
/// SnapshotError
///

#[derive(Debug, ThisError)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read snapshot '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

///
/// RawSnapshot
/// Models keyed by internal key, plus the external identifier index.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub models: BTreeMap<String, RawModel>,

    #[serde(default)]
    pub index: BTreeMap<String, String>,
}

impl RawSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_slice(json: &[u8]) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_slice(json)?)
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_reader(io::BufReader::new(reader))?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json_slice(&bytes)
    }

    /// SHA-256 over a canonical encoding: the index, then each model as one
    /// JSON record followed by its states in pre-order, each state carrying
    /// its child count. Maps are key-ordered. State nesting is walked with an
    /// explicit stack, so any depth hashes without recursion.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut writer = HashWriter(Sha256::new());

        // string-keyed maps and JSON values always serialize
        let _ = serde_json::to_writer(&mut writer, &self.index);
        for (entry, model) in &self.models {
            let _ = serde_json::to_writer(&mut writer, &ModelRecord::new(entry, model));

            let mut stack: Vec<&RawState> = model.state_chart.child_states.iter().rev().collect();
            while let Some(state) = stack.pop() {
                let _ = serde_json::to_writer(&mut writer, &StateRecord::from(state));
                stack.extend(state.child_states.iter().rev());
            }
        }

        Fingerprint(writer.0.finalize().into())
    }
}

// Flat views hashed by `RawSnapshot::fingerprint`.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelRecord<'a> {
    entry: &'a str,
    key: &'a str,
    name: &'a str,
    api_identifier: &'a str,
    namespace: &'a RawNamespace,
    fields: &'a BTreeMap<String, RawField>,
    graphql_type_name: &'a str,
    chart_key: &'a str,
    initial_child_state: Option<&'a str>,
    state_in_action_code: bool,
    child_states: usize,
}

impl<'a> ModelRecord<'a> {
    fn new(entry: &'a str, model: &'a RawModel) -> Self {
        let chart = &model.state_chart;

        Self {
            entry,
            key: &model.key,
            name: &model.name,
            api_identifier: &model.api_identifier,
            namespace: &model.namespace,
            fields: &model.fields,
            graphql_type_name: &model.graphql_type_name,
            chart_key: &chart.key,
            initial_child_state: chart.initial_child_state.as_deref(),
            state_in_action_code: chart.state_in_action_code,
            child_states: chart.child_states.len(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateRecord<'a> {
    key: &'a str,
    name: &'a str,
    is_record_birth_place: bool,
    is_undeleteable_system_state: bool,
    restore_history: bool,
    custom_api_identifier: Option<&'a str>,
    initial_child_state: Option<&'a str>,
    child_states: usize,
}

impl<'a> From<&'a RawState> for StateRecord<'a> {
    fn from(state: &'a RawState) -> Self {
        Self {
            key: &state.key,
            name: &state.name,
            is_record_birth_place: state.is_record_birth_place,
            is_undeleteable_system_state: state.is_undeleteable_system_state,
            restore_history: state.restore_history,
            custom_api_identifier: state.custom_api_identifier.as_deref(),
            initial_child_state: state.initial_child_state.as_deref(),
            child_states: state.child_states.len(),
        }
    }
}

///
/// RawModel
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModel {
    pub key: String,
    pub name: String,
    pub api_identifier: String,

    #[serde(default)]
    pub namespace: RawNamespace,

    #[serde(default)]
    pub fields: BTreeMap<String, RawField>,

    pub graphql_type_name: String,

    #[serde(default)]
    pub state_chart: RawStateChart,
}

///
/// RawNamespace
/// Grouping path, either as segments or as a dotted string.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawNamespace {
    Segments(Vec<String>),
    Dotted(String),
}

impl RawNamespace {
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::Segments(segments) => segments
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
            Self::Dotted(path) => path
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Default for RawNamespace {
    fn default() -> Self {
        Self::Segments(Vec::new())
    }
}

///
/// RawField
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub key: String,
    pub name: String,
    pub api_identifier: String,
    pub field_type: String,

    #[serde(default = "default_true")]
    pub internal_writable: bool,

    #[serde(default)]
    pub configuration: Map<String, Value>,
}

const fn default_true() -> bool {
    true
}

///
/// RawStateChart
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawStateChart {
    pub key: String,
    pub initial_child_state: Option<String>,
    pub state_in_action_code: bool,
    pub child_states: Vec<RawState>,
}

///
/// RawState
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawState {
    pub key: String,
    pub name: String,
    pub is_record_birth_place: bool,
    pub is_undeleteable_system_state: bool,
    pub restore_history: bool,
    pub custom_api_identifier: Option<String>,
    pub initial_child_state: Option<String>,
    pub child_states: Vec<Self>,
}

///
/// Fingerprint
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

// Feeds serializer output straight into the digest.
struct HashWriter(Sha256);

impl io::Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

///
/// TESTS
///
