//! Wire formats of the tracker REST API: response models and request payloads.
//!
//! Models are lenient (unknown keys ignored, optional keys defaulted) because
//! the same object comes back in different shapes from different endpoints.
//! Payloads are strict and omit unset keys.

pub mod field;
pub mod project;
pub mod project_category;
pub mod work_type;

pub use field::*;
pub use project::*;
pub use project_category::*;
pub use work_type::*;

use serde::{Deserialize, Deserializer};

/// One page of a `startAt`/`maxResults` search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    #[serde(default)]
    pub start_at: usize,
    #[serde(default)]
    pub max_results: usize,
    #[serde(default)]
    pub total: usize,
    /// Absent on some endpoints; a missing flag means there may be more.
    #[serde(default)]
    pub is_last: bool,
}

/// Identifiers arrive as JSON strings from reads and as numbers from some creates.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    }

    #[test]
    fn test_id_accepts_string_and_number() {
        let a: Holder = serde_json::from_str(r#"{"id": "10001"}"#).unwrap();
        let b: Holder = serde_json::from_str(r#"{"id": 10001}"#).unwrap();
        assert_eq!(a.id, "10001");
        assert_eq!(b.id, "10001");
    }

    #[test]
    fn test_search_page_defaults() {
        let page: SearchPage<Holder> = serde_json::from_str(r#"{"values": [{"id": 1}]}"#).unwrap();
        assert_eq!(page.values.len(), 1);
        assert!(!page.is_last);
    }
}
