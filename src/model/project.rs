//! Projects.

use super::string_or_number;
use super::ProjectCategoryModel;
use serde::{Deserialize, Serialize};

/// A project as returned by `GET /project/{id}`.
///
/// `POST /project` answers with only `id` and `key`; every other field then
/// takes its default until the project is read back.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModel {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lead: Option<ProjectLead>,
    #[serde(default)]
    pub project_type_key: Option<String>,
    #[serde(default)]
    pub assignee_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub project_category: Option<ProjectCategoryModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLead {
    #[serde(default)]
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Numeric on the wire even though reads report it as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}
