//! Custom fields.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<FieldSchema>,
    #[serde(default)]
    pub searcher_key: Option<String>,
}

impl FieldModel {
    /// The custom field type key, e.g. `com.atlassian.jira.plugin.system.customfieldtypes:select`.
    pub fn field_type(&self) -> Option<&str> {
        self.schema.as_ref().and_then(|s| s.custom.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub custom: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fixed at creation; dropped from update requests.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searcher_key: Option<String>,
}
