//! Scalar attribute values and the records that carry them.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A scalar attribute value.
///
/// Serialized untagged, so a JSON record reads naturally:
/// `{"hairLength": 25, "sex": "female", "adult": true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean flag.
    Bool(bool),
    /// A real number.
    Number(f64),
    /// Free text.
    Text(String),
}

impl Value {
    /// Coerce the value to a number for comparison.
    ///
    /// Booleans become 1 or 0, text is parsed after trimming whitespace.
    /// Returns `None` when no finite number can be obtained.
    #[must_use]
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Loose equality: same variants compare directly, mixed variants compare
    /// as numbers.
    #[must_use]
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => match (self.to_number(), other.to_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Return the value as a number if it reads as a signed decimal literal.
    ///
    /// Finite numbers always qualify. Text qualifies only when it matches
    /// `^[+-]?\d+(\.\d+)?$`. Booleans never do.
    #[must_use]
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Text(s) if is_decimal_literal(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// `^[+-]?\d+(\.\d+)?$`
pub(crate) fn is_decimal_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.is_none_or(all_digits)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            // Integral numbers render without a trailing ".0".
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// One training or prediction record: attribute name to value.
///
/// Attributes keep their insertion order, which is also the order candidate
/// splits are enumerated in. Setting an existing attribute replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Set an attribute and return the record.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Return `true` if the attribute is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Return `true` if the record has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Copy of this record without the given attributes.
    #[must_use]
    pub fn without(&self, ignored: &[String]) -> Record {
        Record {
            attributes: self
                .attributes
                .iter()
                .filter(|(k, _)| !ignored.contains(k))
                .cloned()
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Record {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for (k, v) in &self.attributes {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((key, value)) = access.next_entry::<String, Option<Value>>()? {
                    // null marks an absent attribute
                    if let Some(value) = value {
                        record.insert(key, value);
                    }
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, Value, is_decimal_literal};

    #[test]
    fn decimal_literal_pattern() {
        for ok in ["0", "25", "-5", "+7", "2.5", "-0.125"] {
            assert!(is_decimal_literal(ok), "{ok} should match");
        }
        for bad in ["", "+", "1.", ".5", "1e5", " 3", "abc", "1.2.3", "--1"] {
            assert!(!is_decimal_literal(bad), "{bad} should not match");
        }
    }

    #[test]
    fn as_decimal_by_variant() {
        assert_eq!(Value::from(25).as_decimal(), Some(25.0));
        assert_eq!(Value::from("-1.5").as_decimal(), Some(-1.5));
        assert_eq!(Value::from("male").as_decimal(), None);
        assert_eq!(Value::from(true).as_decimal(), None);
        assert_eq!(Value::Number(f64::NAN).as_decimal(), None);
    }

    #[test]
    fn loose_equality_coerces_mixed_variants() {
        assert!(Value::from("25").loosely_equals(&Value::from(25)));
        assert!(Value::from(true).loosely_equals(&Value::from(1)));
        assert!(!Value::from("abc").loosely_equals(&Value::from(0)));
        assert!(Value::from("abc").loosely_equals(&Value::from("abc")));
        assert!(!Value::from("Abc").loosely_equals(&Value::from("abc")));
    }

    #[test]
    fn display_integral_numbers_without_fraction() {
        assert_eq!(Value::from(1).to_string(), "1");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(-3.0).to_string(), "-3");
        assert_eq!(Value::from("male").to_string(), "male");
        assert_eq!(Value::from(false).to_string(), "false");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut record = Record::from([("a", 1), ("b", 2)]);
        record.insert("a", 10);
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(record.get("a"), Some(&Value::from(10)));
    }

    #[test]
    fn without_drops_ignored_keys() {
        let record = Record::new()
            .with("person", "Homer")
            .with("hairLength", 0)
            .with("sex", "male");
        let filtered = record.without(&["person".to_string()]);
        assert_eq!(filtered.len(), 2);
        assert!(!filtered.contains_key("person"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn deserialize_keeps_document_order_and_skips_null() {
        let record: Record =
            serde_json::from_str(r#"{"z": 1, "a": "x", "m": null, "b": true}"#).unwrap();
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a", "b"]);
        assert_eq!(record.get("z"), Some(&Value::Number(1.0)));
        assert_eq!(record.get("b"), Some(&Value::Bool(true)));
    }

    #[test]
    fn serialize_as_json_object() {
        let record = Record::new().with("hairLength", 25).with("sex", "female");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"hairLength":25.0,"sex":"female"}"#);
    }
}
