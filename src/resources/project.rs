//! `tracker_project`
//!
//! The create endpoint answers with the new project's id and key only, so a
//! post-create read fetches the full record before it is mapped into state.
//! `trash_on_destroy` never leaves this process: it picks between a
//! restorable and a permanent delete.

use super::{listed, page_of, required};
use crate::clients::ProjectClient;
use crate::model::{ProjectModel, ProjectPayload};
use crud_engine::{CrudHooks, Diagnostics, ListHooks, OpContext, ResourceKind, Value};
use serde::Serialize;

pub struct Project;

impl ResourceKind for Project {
    type State = ProjectState;
    type Payload = ProjectPayload;
    type Model = ProjectModel;
    const TYPE_NAME: &'static str = "tracker_project";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectState {
    pub id: Value<String>,
    pub key: Value<String>,
    pub name: Value<String>,
    pub description: Value<String>,
    pub lead_account_id: Value<String>,
    pub project_type_key: Value<String>,
    pub assignee_type: Value<String>,
    pub url: Value<String>,
    pub category_id: Value<String>,
    /// Local only. When set, destroy moves the project to the trash.
    pub trash_on_destroy: bool,
}

pub fn build_payload(state: &ProjectState, diags: &mut Diagnostics) -> Option<ProjectPayload> {
    let key = required(&state.key, "key", diags);
    let name = required(&state.name, "name", diags);

    let category_id = match state.category_id.as_known() {
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                diags.add_error(
                    "Invalid attribute value",
                    format!("`category_id` must be a numeric project category id, got {raw:?}."),
                );
                return None;
            }
        },
        None => None,
    };

    Some(ProjectPayload {
        key: key?,
        name: name?,
        description: state.description.as_known().cloned(),
        lead_account_id: state.lead_account_id.as_known().cloned(),
        project_type_key: state.project_type_key.as_known().cloned(),
        assignee_type: state.assignee_type.as_known().cloned(),
        url: state.url.as_known().cloned(),
        category_id,
    })
}

pub fn map_to_state(model: ProjectModel, state: &mut ProjectState, diags: &mut Diagnostics) {
    if model.id.is_empty() {
        diags.add_error(
            "Unexpected tracker_project response",
            "The response does not identify the project.",
        );
        return;
    }
    state.id = Value::known(model.id);
    state.key = Value::known(model.key);
    state.name = Value::known(model.name);
    state.description = Value::from_option(model.description);
    state.lead_account_id = Value::from_option(model.lead.map(|lead| lead.account_id));
    state.project_type_key = Value::from_option(model.project_type_key);
    state.assignee_type = Value::from_option(model.assignee_type);
    state.url = Value::from_option(model.url);
    state.category_id = Value::from_option(model.project_category.map(|c| c.id));
}

pub fn hooks(client: ProjectClient) -> CrudHooks<Project> {
    CrudHooks::<Project>::new()
        .build_payload(build_payload)
        .map_to_state(map_to_state)
        .extract_id(|state: &ProjectState| state.id.as_str().to_string())
        .create({
            let client = client.clone();
            move |ctx, payload| {
                let client = client.clone();
                async move { client.create(&ctx, payload).await }
            }
        })
        .post_create({
            let client = client.clone();
            move |ctx, created: ProjectModel| {
                let client = client.clone();
                async move { client.get(&ctx, &created.id).await }
            }
        })
        .read({
            let client = client.clone();
            move |ctx, id| {
                let client = client.clone();
                async move { client.get(&ctx, &id).await }
            }
        })
        .update({
            let client = client.clone();
            move |ctx, id, payload| {
                let client = client.clone();
                async move { client.update(&ctx, &id, payload).await }
            }
        })
        .delete(move |ctx: OpContext, id: String, state: &ProjectState| {
            let client = client.clone();
            let enable_undo = state.trash_on_destroy;
            async move { client.delete(&ctx, &id, enable_undo).await }
        })
        .treat_delete_404_as_success(true)
}

pub fn list_hooks(client: ProjectClient) -> ListHooks<ProjectModel, ProjectState> {
    ListHooks::paged(move |ctx: OpContext, start_at: usize, size: usize| {
        let client = client.clone();
        async move { page_of("list tracker_project", client.search(&ctx, start_at, size).await) }
    })
    .key_of(|model: &ProjectModel| model.id.clone())
    .map_to_out(|model: ProjectModel, diags: &mut Diagnostics| listed(model, diags, map_to_state))
}
