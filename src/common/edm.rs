use chrono::{DateTime, Utc};
use serde_json::Number;
use std::{fmt, str};

/// Suffix of the sibling key carrying a property's EDM type hint.
pub const TYPE_HINT_SUFFIX: &str = "@odata.type";

/// EDM type tags understood by the service.
///
/// ```rust
/// use tables_crud::common::edm;
///
/// let edm_type: edm::EdmType = "Edm.Int64".parse().unwrap();
/// assert_eq!(edm_type, edm::EdmType::Int64);
/// assert_eq!(edm_type.as_str(), "Edm.Int64");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EdmType {
    /// Arbitrary bytes, base64 on the wire.
    Binary,
    /// Boolean.
    Boolean,
    /// UTC instant, ISO-8601 on the wire.
    DateTime,
    /// 64-bit floating point; `NaN`, `Infinity` and `-Infinity` travel as strings.
    Double,
    /// GUID text in the hyphenated form.
    Guid,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer, decimal text on the wire.
    Int64,
    /// UTF-8 string.
    String,
}

impl EdmType {
    /// The value of the `@odata.type` hint for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "Edm.Binary",
            Self::Boolean => "Edm.Boolean",
            Self::DateTime => "Edm.DateTime",
            Self::Double => "Edm.Double",
            Self::Guid => "Edm.Guid",
            Self::Int32 => "Edm.Int32",
            Self::Int64 => "Edm.Int64",
            Self::String => "Edm.String",
        }
    }
}

impl fmt::Display for EdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a type hint names no known EDM type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownEdmType(pub String);

impl fmt::Display for UnknownEdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown EDM type `{}`", self.0)
    }
}

impl std::error::Error for UnknownEdmType {}

impl str::FromStr for EdmType {
    type Err = UnknownEdmType;

    fn from_str(hint: &str) -> Result<Self, Self::Err> {
        match hint {
            "Edm.Binary" => Ok(Self::Binary),
            "Edm.Boolean" => Ok(Self::Boolean),
            "Edm.DateTime" => Ok(Self::DateTime),
            "Edm.Double" => Ok(Self::Double),
            "Edm.Guid" => Ok(Self::Guid),
            "Edm.Int32" => Ok(Self::Int32),
            "Edm.Int64" => Ok(Self::Int64),
            "Edm.String" => Ok(Self::String),
            other => Err(UnknownEdmType(other.to_string())),
        }
    }
}

/// A native value, serialized without a type hint.
#[derive(Clone, Debug, PartialEq)]
pub enum PlainValue {
    /// Bytes, written as base64 text.
    Binary(Vec<u8>),
    /// Boolean.
    Boolean(bool),
    /// UTC instant, written as ISO-8601 text with millisecond precision.
    DateTime(DateTime<Utc>),
    /// JSON number; integers and floats are kept as received.
    Number(Number),
    /// String.
    String(String),
}

impl PlainValue {
    /// A finite float as a JSON number; `None` for NaN and infinities.
    pub fn double(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Binary(_) => "binary",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "date",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }
}

impl From<&str> for PlainValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PlainValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PlainValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for PlainValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<Vec<u8>> for PlainValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<DateTime<Utc>> for PlainValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

/// A value explicitly tagged with an EDM type.
///
/// ```rust
/// use tables_crud::common::edm;
///
/// let big = edm::EdmValue::int64("12345678910");
/// assert_eq!(big.edm_type, edm::EdmType::Int64);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EdmValue {
    /// The declared EDM type.
    pub edm_type: EdmType,
    /// The raw value; its shape must agree with `edm_type`.
    pub value: PlainValue,
}

impl EdmValue {
    /// Tag any value with an EDM type. The pair is validated on serialization.
    pub fn new(edm_type: EdmType, value: impl Into<PlainValue>) -> Self {
        Self {
            edm_type,
            value: value.into(),
        }
    }

    /// A 64-bit integer carried as its decimal text.
    pub fn int64(decimal: impl Into<String>) -> Self {
        Self::new(EdmType::Int64, PlainValue::String(decimal.into()))
    }

    /// A GUID carried as its canonical text.
    pub fn guid(text: impl Into<String>) -> Self {
        Self::new(EdmType::Guid, PlainValue::String(text.into()))
    }

    /// Bytes tagged as `Edm.Binary`.
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(EdmType::Binary, PlainValue::Binary(bytes.into()))
    }

    /// A UTC instant tagged as `Edm.DateTime`.
    pub fn date_time(date: DateTime<Utc>) -> Self {
        Self::new(EdmType::DateTime, PlainValue::DateTime(date))
    }
}

/// A property value: either a plain native or an EDM-tagged value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Tagged value, written with a type hint.
    Edm(EdmValue),
    /// Native value, written without a type hint.
    Plain(PlainValue),
}

macro_rules! impl_plain_property_value {
    ($($native:ty),* $(,)?) => {
        $(
            impl From<$native> for PropertyValue {
                fn from(value: $native) -> Self {
                    Self::Plain(value.into())
                }
            }
        )*
    };
}

impl_plain_property_value!(&str, String, bool, i32, Vec<u8>, DateTime<Utc>, PlainValue);

impl From<EdmValue> for PropertyValue {
    fn from(value: EdmValue) -> Self {
        Self::Edm(value)
    }
}
