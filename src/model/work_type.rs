//! Work types (issue types).

use super::string_or_number;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTypeModel {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hierarchy_level: i64,
    #[serde(default)]
    pub avatar_id: Option<i64>,
    /// Present only on project-scoped work types.
    #[serde(default)]
    pub scope: Option<WorkTypeScope>,
}

impl WorkTypeModel {
    pub fn is_global(&self) -> bool {
        self.scope.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkTypeScope {
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Body of `POST /issuetype` and `PUT /issuetype/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTypePayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fixed at creation; dropped from update requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<i64>,
}
