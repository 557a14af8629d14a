use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

///
/// EnumOption
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EnumOption {
    pub key: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(
        default,
        rename = "createdDate",
        deserialize_with = "deserialize_created_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

// The generator has written both RFC 3339 strings and epoch milliseconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedDate {
    Millis(i64),
    Text(String),
}

fn deserialize_created_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<CreatedDate>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let parsed = match raw {
        CreatedDate::Millis(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp {ms} out of range")))?,
        CreatedDate::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map_err(serde::de::Error::custom)?
            .with_timezone(&Utc),
    };

    Ok(Some(parsed))
}

///
/// EnumOptionTable
///
/// Ordered options with a hash-backed lookup by wire name. When a name is
/// repeated the first option wins the lookup; load validation rejects such
/// tables anyway.
///

#[derive(Clone, Debug, Default)]
pub struct EnumOptionTable {
    options: Vec<EnumOption>,
    by_name: HashMap<String, usize>,
}

impl EnumOptionTable {
    #[must_use]
    pub fn new(options: Vec<EnumOption>) -> Self {
        let mut by_name = HashMap::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            by_name.entry(option.name.clone()).or_insert(i);
        }

        Self { options, by_name }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EnumOption> {
        self.by_name.get(name).map(|&i| &self.options[i])
    }

    #[must_use]
    pub fn options(&self) -> &[EnumOption] {
        &self.options
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.name.as_str())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl Serialize for EnumOptionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.options)
    }
}

impl<'de> Deserialize<'de> for EnumOptionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<EnumOption>::deserialize(deserializer).map(Self::new)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn option(key: &str, name: &str) -> EnumOption {
        EnumOption {
            key: key.to_string(),
            name: name.to_string(),
            color: None,
            created_at: None,
        }
    }

    #[test]
    fn lookup_is_by_wire_name() {
        let table = EnumOptionTable::new(vec![option("k1", "GRAMS"), option("k2", "POUNDS")]);

        assert!(table.contains("GRAMS"));
        assert!(!table.contains("grams"));
        assert_eq!(table.get("POUNDS").map(|o| o.key.as_str()), Some("k2"));
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["GRAMS", "POUNDS"]);
    }

    #[test]
    fn first_duplicate_wins_lookup() {
        let table = EnumOptionTable::new(vec![option("k1", "A"), option("k2", "A")]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("A").map(|o| o.key.as_str()), Some("k1"));
    }

    #[test]
    fn created_date_accepts_text_and_millis() {
        let text: EnumOption = serde_json::from_str(
            r#"{ "key": "k", "name": "A", "createdDate": "2022-08-08T23:06:40Z" }"#,
        )
        .unwrap();
        let millis: EnumOption =
            serde_json::from_str(r#"{ "key": "k", "name": "A", "createdDate": 1660000000000 }"#)
                .unwrap();
        let null: EnumOption =
            serde_json::from_str(r#"{ "key": "k", "name": "A", "createdDate": null }"#).unwrap();

        assert_eq!(text.created_at.map(|t| t.timestamp()), Some(1_660_000_000));
        assert_eq!(millis.created_at.map(|t| t.timestamp()), Some(1_660_000_000));
        assert!(null.created_at.is_none());
    }

    #[test]
    fn unknown_option_keys_are_rejected() {
        let err = serde_json::from_str::<EnumOption>(r#"{ "key": "k", "name": "A", "weight": 3 }"#);
        assert!(err.is_err());
    }
}
