//! Three-valued attributes: known, null, or not yet known (computed during apply).

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value<T> {
    Known(T),
    #[default]
    Null,
    Unknown,
}

impl<T> Value<T> {
    pub fn known(value: T) -> Self {
        Self::Known(value)
    }

    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Clone> Value<T> {
    pub fn known_or(&self, fallback: T) -> T {
        self.as_known().cloned().unwrap_or(fallback)
    }
}

impl Value<String> {
    /// Known value as `&str`, or `""` when null/unknown.
    pub fn as_str(&self) -> &str {
        self.as_known().map_or("", String::as_str)
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(value) => value.serialize(serializer),
            Self::Null | Self::Unknown => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_null() {
        let value: Value<String> = Value::default();
        assert!(value.is_null());
        assert_eq!(value.as_str(), "");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from_option(Some(3)), Value::Known(3));
        assert_eq!(Value::<i64>::from_option(None), Value::Null);
    }

    #[test]
    fn test_serializes_unknown_as_null() {
        let known = serde_json::to_string(&Value::known("ops".to_string())).unwrap();
        let unknown = serde_json::to_string(&Value::<String>::Unknown).unwrap();
        assert_eq!(known, "\"ops\"");
        assert_eq!(unknown, "null");
    }
}
