//! Normalized query records.
//!
//! Every record returned by the REST query resources carries an
//! `attributes` object next to its fields:
//!
//! ```json
//! {
//!   "attributes": { "type": "Account", "url": "/services/data/v62.0/sobjects/Account/001..." },
//!   "Id": "001...",
//!   "Name": "Acme"
//! }
//! ```
//!
//! [`Record::from_raw`] splits that object into [`Attributes`] and the plain
//! field map, keeping the original mapping alongside.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved key holding record metadata.
pub const ATTRIBUTES_KEY: &str = "attributes";

/// Record metadata taken from the `attributes` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// SObject type name, e.g. `Account`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Canonical REST URL of the record.
    pub url: String,
}

impl Attributes {
    fn from_value(value: &Value) -> Result<Self, NormalizeError> {
        let attrs = value
            .as_object()
            .ok_or_else(|| NormalizeError::AttributesNotObject {
                found: json_type_name(value),
            })?;

        Ok(Self {
            type_name: string_attribute(attrs, "type")?,
            url: string_attribute(attrs, "url")?,
        })
    }
}

fn string_attribute(
    attrs: &Map<String, Value>,
    field: &'static str,
) -> Result<String, NormalizeError> {
    match attrs.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(NormalizeError::AttributeNotString {
            field,
            found: json_type_name(other),
        }),
        None => Err(NormalizeError::MissingAttribute { field }),
    }
}

/// Name of a JSON value's type, for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A raw record's `attributes` block is missing or has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("record has no `attributes` key")]
    MissingAttributes,

    #[error("`attributes` must be an object, found {found}")]
    AttributesNotObject { found: &'static str },

    #[error("`attributes` has no `{field}` entry")]
    MissingAttribute { field: &'static str },

    #[error("`attributes.{field}` must be a string, found {found}")]
    AttributeNotString {
        field: &'static str,
        found: &'static str,
    },
}

/// A query record with its metadata separated from its fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Metadata from the `attributes` key.
    pub attributes: Attributes,
    /// Every other key, in server order. Nested values (relationship
    /// objects, subquery results) are kept as-is.
    pub fields: Map<String, Value>,
    /// The record exactly as received.
    pub raw: Map<String, Value>,
}

impl Record {
    /// Normalize one raw record.
    pub fn from_raw(raw: Map<String, Value>) -> Result<Self, NormalizeError> {
        let attributes = match raw.get(ATTRIBUTES_KEY) {
            Some(value) => Attributes::from_value(value)?,
            None => return Err(NormalizeError::MissingAttributes),
        };

        let fields = raw
            .iter()
            .filter(|(key, _)| key.as_str() != ATTRIBUTES_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            attributes,
            fields,
            raw,
        })
    }

    /// SObject type name.
    pub fn type_name(&self) -> &str {
        &self.attributes.type_name
    }

    /// Canonical record URL.
    pub fn url(&self) -> &str {
        &self.attributes.url
    }

    /// Field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The `Id` field, when present as a string.
    pub fn id(&self) -> Option<&str> {
        self.get("Id").and_then(Value::as_str)
    }
}

/// Normalize a page of raw records in order.
///
/// The first malformed record fails the whole batch; no partial page is
/// returned.
pub fn normalize_records(raws: Vec<Map<String, Value>>) -> Result<Vec<Record>, NormalizeError> {
    normalize_indexed(raws).map_err(|(_, error)| error)
}

/// Like [`normalize_records`], but reports the position of the bad record.
pub(crate) fn normalize_indexed(
    raws: Vec<Map<String, Value>>,
) -> Result<Vec<Record>, (usize, NormalizeError)> {
    raws.into_iter()
        .enumerate()
        .map(|(index, raw)| Record::from_raw(raw).map_err(|error| (index, error)))
        .collect()
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = NormalizeError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        Record::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_normalize_account() {
        let raw = object(json!({
            "attributes": {"type": "Account", "url": "/x"},
            "Name": "Acme"
        }));

        let record = Record::from_raw(raw.clone()).unwrap();

        assert_eq!(record.type_name(), "Account");
        assert_eq!(record.url(), "/x");
        assert_eq!(record.fields, object(json!({"Name": "Acme"})));
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn test_fields_keep_server_order_and_nesting() {
        let raw = object(json!({
            "attributes": {"type": "Contact", "url": "/services/data/v62.0/sobjects/Contact/003xx"},
            "Id": "003xx",
            "LastName": "Smith",
            "Account": {
                "attributes": {"type": "Account", "url": "/services/data/v62.0/sobjects/Account/001xx"},
                "Name": "Acme"
            },
            "Email": null,
            "Score__c": 12.5,
            "Tags__c": ["a", "b"]
        }));

        let record = Record::from_raw(raw).unwrap();

        let keys: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Id", "LastName", "Account", "Email", "Score__c", "Tags__c"]);
        assert_eq!(record.id(), Some("003xx"));
        assert_eq!(record.get("Email"), Some(&Value::Null));
        assert_eq!(record.get("Account").unwrap()["Name"], "Acme");
        assert!(record.get("Account").unwrap().get("attributes").is_some());
    }

    #[test]
    fn test_attributes_string_is_typed_error() {
        let raw = object(json!({"attributes": "Account", "Name": "Acme"}));

        let err = Record::from_raw(raw).unwrap_err();
        assert_eq!(err, NormalizeError::AttributesNotObject { found: "string" });
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_missing_attributes() {
        let raw = object(json!({"Name": "Acme"}));
        assert_eq!(
            Record::from_raw(raw).unwrap_err(),
            NormalizeError::MissingAttributes
        );
    }

    #[test]
    fn test_missing_url() {
        let raw = object(json!({"attributes": {"type": "AggregateResult"}, "expr0": 4}));
        assert_eq!(
            Record::try_from(raw).unwrap_err(),
            NormalizeError::MissingAttribute { field: "url" }
        );
    }

    #[test]
    fn test_non_string_type() {
        let raw = object(json!({"attributes": {"type": 7, "url": "/x"}}));
        assert_eq!(
            Record::from_raw(raw).unwrap_err(),
            NormalizeError::AttributeNotString {
                field: "type",
                found: "number"
            }
        );
    }

    #[test]
    fn test_record_with_only_attributes() {
        let raw = object(json!({"attributes": {"type": "Lead", "url": "/l"}}));
        let record = Record::from_raw(raw).unwrap();
        assert!(record.fields.is_empty());
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_normalize_records_keeps_order() {
        let raws = vec![
            object(json!({"attributes": {"type": "Account", "url": "/a/1"}, "Id": "001A"})),
            object(json!({"attributes": {"type": "Contact", "url": "/c/1"}, "Id": "003A"})),
        ];

        let records = normalize_records(raws).unwrap();
        let ids: Vec<_> = records.iter().filter_map(Record::id).collect();
        assert_eq!(ids, ["001A", "003A"]);
        assert_eq!(records[1].type_name(), "Contact");
    }

    #[test]
    fn test_normalize_records_second_bad_record_fails_batch() {
        let raws = vec![
            object(json!({"attributes": {"type": "Account", "url": "/a/1"}, "Id": "001A"})),
            object(json!({"Id": "001B"})),
            object(json!({"attributes": {"type": "Account", "url": "/a/3"}, "Id": "001C"})),
        ];

        let result = normalize_records(raws.clone());
        assert_eq!(result, Err(NormalizeError::MissingAttributes));

        let (index, error) = normalize_indexed(raws).unwrap_err();
        assert_eq!(index, 1);
        assert_eq!(error, NormalizeError::MissingAttributes);
    }

    #[test]
    fn test_normalize_records_empty_page() {
        assert!(normalize_records(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_serialize_record() {
        let raw = object(json!({"attributes": {"type": "Lead", "url": "/l"}, "Id": "00Q1"}));
        let record = Record::from_raw(raw).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["attributes"]["type"], "Lead");
        assert_eq!(value["fields"]["Id"], "00Q1");
    }
}
