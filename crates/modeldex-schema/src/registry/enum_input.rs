use crate::node::EnumOptionTable;
use serde::Serialize;
use std::collections::HashSet;

///
/// EnumInput
/// Candidate value(s) for an enum field.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EnumInput<'a> {
    One(&'a str),
    Many(Vec<&'a str>),
}

impl<'a> EnumInput<'a> {
    /// Number of values as given, before deduplication.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn values(&self) -> &[&'a str] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

impl<'a> From<&'a str> for EnumInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::One(value)
    }
}

impl<'a> From<&'a String> for EnumInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::One(value)
    }
}

impl<'a> From<Vec<&'a str>> for EnumInput<'a> {
    fn from(values: Vec<&'a str>) -> Self {
        Self::Many(values)
    }
}

impl<'a> From<&'a [String]> for EnumInput<'a> {
    fn from(values: &'a [String]) -> Self {
        Self::Many(values.iter().map(String::as_str).collect())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for EnumInput<'a> {
    fn from(values: [&'a str; N]) -> Self {
        Self::Many(values.to_vec())
    }
}

///
/// EnumVerdict
///
/// Accepted selection for an enum field. Values are deduplicated by exact
/// match and keep the order they were first given in; values missing from
/// the option table are listed separately so callers can report them.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumVerdict {
    selected: Vec<String>,
    non_canonical: Vec<String>,
}

impl EnumVerdict {
    pub(crate) fn select(values: &[&str], options: &EnumOptionTable) -> Self {
        let mut verdict = Self::default();
        let mut seen = HashSet::with_capacity(values.len());

        for &value in values {
            if !seen.insert(value) {
                continue;
            }
            if !options.contains(value) {
                verdict.non_canonical.push(value.to_string());
            }
            verdict.selected.push(value.to_string());
        }

        verdict
    }

    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    #[must_use]
    pub fn non_canonical(&self) -> &[String] {
        &self.non_canonical
    }

    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        self.non_canonical.is_empty()
    }
}

///
/// TESTS
///
