use std::collections::BTreeMap;

/// A single resolved style value.
///
/// Enumerated tokens (`"center"`, `"row"`) are carried as [`StyleValue::Text`]; the engine
/// validates them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Integral number, kept distinct so it serializes without a fractional part.
    Integer(i64),
    /// Fractional number.
    Number(f64),
    /// String or enumerated token.
    Text(String),
}

impl StyleValue {
    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// String view of the value, if it is a string or token.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for StyleValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Self::Integer(value as i64)
        } else {
            Self::Number(value)
        }
    }
}

/// Flat mapping from property name to resolved value.
///
/// Keys are camelCase property names (`justifyContent`). There are no nested selectors.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StyleRecord(BTreeMap<String, StyleValue>);

impl StyleRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.set(property, value);
        self
    }

    /// Assign `property`, replacing any previous value.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<StyleValue>) {
        self.0.insert(property.into(), value.into());
    }

    /// Lookup a property.
    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.0.get(property)
    }

    /// Overlay every property explicitly set in `layer` on top of `self`.
    ///
    /// Properties absent from `layer` are left untouched.
    pub fn overlay(&mut self, layer: &StyleRecord) {
        for (k, v) in &layer.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Number of properties set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no property is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `None` for an empty record; the IR never carries `{}` styles.
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for StyleRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
