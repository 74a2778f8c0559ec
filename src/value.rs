//! Generic property values.
//!
//! [`PropertyValue`] is what a resource holds for each property: a scalar for
//! plain record columns, or a nested mapping/sequence tree for the decoded
//! structured output. Serialization produces the plain JSON shape (mapping
//! as object, sequence as array, scalars as themselves) so transports can
//! encode resources without knowing the variants.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;

/// String-keyed mapping of nested values. Iteration follows document order;
/// equality ignores order.
pub type Mapping = IndexMap<String, PropertyValue>;

/// A property value: nested mapping, ordered sequence, or scalar.
///
/// # Examples
///
/// ```
/// use task_resources::value::PropertyValue;
///
/// let value = PropertyValue::from(100_i64);
/// assert_eq!(value.as_i64(), Some(100));
/// assert!(value.as_str().is_none());
/// assert!(PropertyValue::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Nested string-keyed mapping.
    Mapping(Mapping),
    /// Ordered sequence.
    Sequence(Vec<PropertyValue>),
    /// Whole number.
    Integer(i64),
    /// Number with a fractional part, or outside the integer range.
    Decimal(f64),
    /// Text.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// Explicit null.
    Null,
}

impl PropertyValue {
    /// Returns `true` for [`PropertyValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The integer, if this is an integer scalar.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// The number as `f64`, for integer and decimal scalars.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// The text, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// The mapping, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(v) => Some(v),
            _ => None,
        }
    }

    /// The sequence, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up `key` in a mapping. `None` for missing keys and non-mappings.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Resolves an RFC 6901 pointer such as `/host_resolution_check/failed_count`.
    ///
    /// The empty pointer resolves to `self`. Sequence segments must be
    /// decimal indexes; `~1` and `~0` unescape to `/` and `~`.
    ///
    /// # Examples
    ///
    /// ```
    /// use task_resources::structured_output::parse_structured_output;
    ///
    /// let text = r#"{"check": {"hosts": ["a", "b"], "failed": 1}}"#;
    /// let value = parse_structured_output(Some(text)).unwrap().unwrap();
    /// assert_eq!(value.pointer("/check/failed").and_then(|v| v.as_i64()), Some(1));
    /// assert_eq!(value.pointer("/check/hosts/1").and_then(|v| v.as_str()), Some("b"));
    /// assert!(value.pointer("/check/missing").is_none());
    /// ```
    pub fn pointer(&self, pointer: &str) -> Option<&PropertyValue> {
        if pointer.is_empty() {
            return Some(self);
        }
        let rest = pointer.strip_prefix('/')?;
        rest.split('/')
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .try_fold(self, |target, segment| match target {
                Self::Mapping(map) => map.get(&segment),
                Self::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Decimal(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// Children are moved onto a heap stack first so dropping a deep tree
// never recurses.
impl Drop for PropertyValue {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_children(self, &mut pending);
        while let Some(mut value) = pending.pop() {
            take_children(&mut value, &mut pending);
        }
    }
}

fn take_children(value: &mut PropertyValue, pending: &mut Vec<PropertyValue>) {
    match value {
        PropertyValue::Mapping(entries) => pending.extend(entries.drain(..).map(|(_, v)| v)),
        PropertyValue::Sequence(items) => pending.append(items),
        _ => {},
    }
}

/// Converts a JSON number that arrived as a float.
///
/// Integral values inside the `i64` range become integers, so `5.0` and
/// `5` decode identically.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number_from_f64(v: f64) -> PropertyValue {
    const LOWER: f64 = i64::MIN as f64;
    const UPPER: f64 = i64::MAX as f64;
    if v.is_finite() && v.fract() == 0.0 && (LOWER..UPPER).contains(&v) {
        PropertyValue::Integer(v as i64)
    } else {
        PropertyValue::Decimal(v)
    }
}

struct PropertyValueVisitor;

impl<'de> Visitor<'de> for PropertyValueVisitor {
    type Value = PropertyValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(PropertyValue::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(PropertyValue::Integer(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).map_or(PropertyValue::Decimal(v as f64), PropertyValue::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(number_from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(PropertyValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(PropertyValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(PropertyValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(PropertyValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(PropertyValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Mapping::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            if entries.contains_key(&key) {
                return Err(de::Error::custom(format_args!("duplicate key `{key}`")));
            }
            let value = map.next_value()?;
            entries.insert(key, value);
        }
        Ok(PropertyValue::Mapping(entries))
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PropertyValueVisitor)
    }
}
