use crate::{
    common::edm::{EdmType, EdmValue, PlainValue, PropertyValue, TYPE_HINT_SUFFIX},
    error::{Error, Result},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::Value;

/// Name of the partition key property.
pub const PARTITION_KEY: &str = "PartitionKey";

/// Name of the row key property.
pub const ROW_KEY: &str = "RowKey";

const ODATA_ANNOTATION_PREFIX: &str = "odata.";
const ODATA_ETAG: &str = "odata.etag";
const NON_FINITE_DOUBLES: [&str; 3] = ["NaN", "Infinity", "-Infinity"];
const HYPHENATED_GUID_LEN: usize = 36;

/// Flat wire representation of an entity: property values and their `@odata.type` hints.
pub type WireRecord = IndexMap<String, Value>;

/// A table entity: an ordered set of named properties addressed by
/// `PartitionKey` and `RowKey`.
///
/// ```rust
/// use tables_crud::common::{edm, entity};
///
/// let mut user = entity::Entity::new("users", "1");
/// user.insert("name", "John");
/// user.insert("visits", edm::EdmValue::int64("12345678910"));
/// assert_eq!(user.partition_key(), Some("users"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    /// The entity tag reported by the service, if any.
    pub etag: Option<String>,
    properties: IndexMap<String, PropertyValue>,
}

impl Entity {
    /// Create an entity holding only its partition and row keys.
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        let mut entity = Self::default();
        entity.insert(PARTITION_KEY, partition_key.into());
        entity.insert(ROW_KEY, row_key.into());
        entity
    }

    /// Set a property, returning the previous value if there was one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.properties.insert(name.into(), value.into())
    }

    /// Get a property by name.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Remove a property, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.shift_remove(name)
    }

    /// Iterate over the properties in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, PropertyValue> {
        self.properties.iter()
    }

    /// Number of properties, keys included.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the entity has no property at all.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The `PartitionKey` property, if present as a string.
    pub fn partition_key(&self) -> Option<&str> {
        self.key_property(PARTITION_KEY)
    }

    /// The `RowKey` property, if present as a string.
    pub fn row_key(&self) -> Option<&str> {
        self.key_property(ROW_KEY)
    }

    fn key_property(&self, name: &str) -> Option<&str> {
        match self.properties.get(name)? {
            PropertyValue::Plain(PlainValue::String(value))
            | PropertyValue::Edm(EdmValue {
                edm_type: EdmType::String,
                value: PlainValue::String(value),
            }) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let properties = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self {
            etag: None,
            properties,
        }
    }
}

impl<'a> IntoIterator for &'a Entity {
    type Item = (&'a String, &'a PropertyValue);
    type IntoIter = indexmap::map::Iter<'a, String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

impl TryFrom<&Entity> for WireRecord {
    type Error = Error;

    fn try_from(entity: &Entity) -> Result<Self> {
        serialize(entity)
    }
}

fn is_key_property(name: &str) -> bool {
    name == PARTITION_KEY || name == ROW_KEY
}

fn type_hint_key(name: &str) -> String {
    format!("{name}{TYPE_HINT_SUFFIX}")
}

fn is_non_finite_double(text: &str) -> bool {
    NON_FINITE_DOUBLES.contains(&text)
}

/// Only the hyphenated form `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` is a valid Guid on the wire.
fn is_hyphenated_guid(text: &str) -> bool {
    text.len() == HYPHENATED_GUID_LEN && uuid::Uuid::parse_str(text).is_ok()
}

fn format_date_time(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn encode_plain(value: &PlainValue) -> Value {
    match value {
        PlainValue::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
        PlainValue::Boolean(value) => Value::Bool(*value),
        PlainValue::DateTime(date) => Value::String(format_date_time(date)),
        PlainValue::Number(number) => Value::Number(number.clone()),
        PlainValue::String(value) => Value::String(value.clone()),
    }
}

fn type_mismatch(property: &str, edm_type: EdmType, value: &PlainValue) -> Error {
    Error::TypeMismatch {
        property: property.to_string(),
        expected: edm_type.to_string(),
        found: value.kind().to_string(),
    }
}

fn encode_edm(property: &str, edm_value: &EdmValue) -> Result<Value> {
    let EdmValue { edm_type, value } = edm_value;
    let encoded = match (edm_type, value) {
        (EdmType::Binary, PlainValue::Binary(_))
        | (EdmType::Boolean, PlainValue::Boolean(_))
        | (EdmType::DateTime, PlainValue::DateTime(_))
        | (EdmType::Double, PlainValue::Number(_))
        | (EdmType::String, PlainValue::String(_)) => encode_plain(value),
        (EdmType::Int32, PlainValue::Number(number))
            if number
                .as_i64()
                .is_some_and(|int| i32::try_from(int).is_ok()) =>
        {
            Value::Number(number.clone())
        }
        (EdmType::Int64, PlainValue::String(decimal)) if decimal.parse::<i64>().is_ok() => {
            Value::String(decimal.clone())
        }
        (EdmType::Double, PlainValue::String(text)) if is_non_finite_double(text) => {
            Value::String(text.clone())
        }
        (EdmType::Guid, PlainValue::String(text)) if is_hyphenated_guid(text) => {
            Value::String(text.clone())
        }
        _ => return Err(type_mismatch(property, *edm_type, value)),
    };
    Ok(encoded)
}

fn encode_key(name: &str, value: &PropertyValue) -> Result<Value> {
    match value {
        PropertyValue::Plain(PlainValue::String(key))
        | PropertyValue::Edm(EdmValue {
            edm_type: EdmType::String,
            value: PlainValue::String(key),
        }) => Ok(Value::String(key.clone())),
        PropertyValue::Plain(other) | PropertyValue::Edm(EdmValue { value: other, .. }) => {
            Err(type_mismatch(name, EdmType::String, other))
        }
    }
}

/// Serialize an entity into its wire record.
///
/// Plain values are written without a type hint; EDM-tagged values always get a sibling
/// `<name>@odata.type` entry. `PartitionKey` and `RowKey` are always plain strings.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] when a tagged value does not match its declared type,
/// or when a key property is not a string.
///
/// ```rust
/// use tables_crud::common::{edm, entity};
/// use serde_json::json;
///
/// let mut user = entity::Entity::new("P", "R");
/// user.insert("int64Prop", edm::EdmValue::int64("12345678910"));
/// let wire = entity::serialize(&user).unwrap();
/// assert_eq!(wire["int64Prop"], json!("12345678910"));
/// assert_eq!(wire["int64Prop@odata.type"], json!("Edm.Int64"));
/// ```
pub fn serialize(entity: &Entity) -> Result<WireRecord> {
    let mut wire = WireRecord::with_capacity(entity.len());
    for (name, value) in entity {
        if is_key_property(name) {
            wire.insert(name.clone(), encode_key(name, value)?);
            continue;
        }
        match value {
            PropertyValue::Plain(plain) => {
                wire.insert(name.clone(), encode_plain(plain));
            }
            PropertyValue::Edm(edm_value) => {
                let encoded = encode_edm(name, edm_value)?;
                wire.insert(name.clone(), encoded);
                wire.insert(
                    type_hint_key(name),
                    Value::String(edm_value.edm_type.as_str().to_string()),
                );
            }
        }
    }
    Ok(wire)
}

fn deserialization_error(property: &str, value: &Value, reason: impl Into<String>) -> Error {
    Error::Deserialization {
        property: property.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn decode_plain(property: &str, raw: &Value) -> Result<PlainValue> {
    match raw {
        Value::Bool(value) => Ok(PlainValue::Boolean(*value)),
        Value::Number(number) => Ok(PlainValue::Number(number.clone())),
        Value::String(value) => Ok(PlainValue::String(value.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(deserialization_error(
            property,
            raw,
            "expected a string, number or boolean",
        )),
    }
}

fn decode_edm(property: &str, edm_type: EdmType, raw: &Value) -> Result<PlainValue> {
    let wrong_shape = || deserialization_error(property, raw, format!("not a valid {edm_type}"));
    let value = match (edm_type, raw) {
        (EdmType::Binary, Value::String(text)) => {
            let bytes = STANDARD
                .decode(text)
                .map_err(|error| deserialization_error(property, raw, error.to_string()))?;
            PlainValue::Binary(bytes)
        }
        (EdmType::Boolean, Value::Bool(value)) => PlainValue::Boolean(*value),
        (EdmType::DateTime, Value::String(text)) => {
            let date = DateTime::parse_from_rfc3339(text)
                .map_err(|error| deserialization_error(property, raw, error.to_string()))?;
            PlainValue::DateTime(date.with_timezone(&Utc))
        }
        (EdmType::Double, Value::Number(number)) => PlainValue::Number(number.clone()),
        (EdmType::Double, Value::String(text)) if is_non_finite_double(text) => {
            PlainValue::String(text.clone())
        }
        (EdmType::Guid, Value::String(text)) => {
            uuid::Uuid::parse_str(text)
                .map_err(|error| deserialization_error(property, raw, error.to_string()))?;
            if text.len() != HYPHENATED_GUID_LEN {
                return Err(deserialization_error(
                    property,
                    raw,
                    "expected the hyphenated guid form",
                ));
            }
            PlainValue::String(text.clone())
        }
        (EdmType::Int32, Value::Number(number))
            if number
                .as_i64()
                .is_some_and(|int| i32::try_from(int).is_ok()) =>
        {
            PlainValue::Number(number.clone())
        }
        (EdmType::Int64, Value::String(text)) => {
            text.parse::<i64>()
                .map_err(|error| deserialization_error(property, raw, error.to_string()))?;
            PlainValue::String(text.clone())
        }
        (EdmType::String, Value::String(text)) => PlainValue::String(text.clone()),
        _ => return Err(wrong_shape()),
    };
    Ok(value)
}

/// Deserialize a wire record into an entity.
///
/// Properties with a sibling `@odata.type` hint become EDM-tagged values; the others keep
/// the JSON type they were received with. `odata.*` annotations are not exposed as
/// properties, except `odata.etag` which fills [`Entity::etag`].
///
/// # Errors
///
/// Returns [`Error::Deserialization`] naming the property and raw value when a value
/// cannot be decoded per its hint, when a hint is unknown or has no sibling value, or
/// when a value is not a JSON scalar.
///
/// ```rust
/// use tables_crud::common::{edm, entity};
/// use serde_json::json;
///
/// let wire = json!({
///     "PartitionKey": "P",
///     "RowKey": "R",
///     "guidProp": "123e4567-e89b-12d3-a456-426614174000",
///     "guidProp@odata.type": "Edm.Guid",
/// });
/// let record: entity::WireRecord = serde_json::from_value(wire).unwrap();
/// let decoded = entity::deserialize(&record).unwrap();
/// assert_eq!(
///     decoded.get("guidProp"),
///     Some(&edm::EdmValue::guid("123e4567-e89b-12d3-a456-426614174000").into()),
/// );
/// ```
pub fn deserialize(wire: &WireRecord) -> Result<Entity> {
    let mut entity = Entity::default();
    for (name, raw) in wire {
        if let Some(property) = name.strip_suffix(TYPE_HINT_SUFFIX) {
            if !wire.contains_key(property) {
                return Err(deserialization_error(property, raw, "type hint without a value"));
            }
            continue;
        }
        if name.starts_with(ODATA_ANNOTATION_PREFIX) {
            if name == ODATA_ETAG {
                entity.etag = raw.as_str().map(str::to_string);
            }
            continue;
        }
        if is_key_property(name) {
            let Value::String(key) = raw else {
                return Err(deserialization_error(name, raw, "expected a string key"));
            };
            entity.insert(name.clone(), key.clone());
            continue;
        }
        let value = match wire.get(&type_hint_key(name)) {
            Some(hint) => {
                let edm_type = hint
                    .as_str()
                    .ok_or_else(|| deserialization_error(name, hint, "type hint is not a string"))?
                    .parse::<EdmType>()
                    .map_err(|error| deserialization_error(name, hint, error.to_string()))?;
                let value = decode_edm(name, edm_type, raw)?;
                PropertyValue::Edm(EdmValue { edm_type, value })
            }
            None => PropertyValue::Plain(decode_plain(name, raw)?),
        };
        entity.insert(name.clone(), value);
    }
    Ok(entity)
}

/// Deserialize every record independently, preserving order.
///
/// # Errors
///
/// Returns the first [`Error::Deserialization`] encountered.
pub fn deserialize_many<'a>(wire: impl IntoIterator<Item = &'a WireRecord>) -> Result<Vec<Entity>> {
    wire.into_iter().map(deserialize).collect()
}
