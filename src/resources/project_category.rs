//! `tracker_project_category`

use super::{all_items, listed, required};
use crate::clients::ProjectCategoryClient;
use crate::model::{ProjectCategoryModel, ProjectCategoryPayload};
use crud_engine::{CrudHooks, Diagnostics, ListHooks, OpContext, ResourceKind, Value};
use serde::Serialize;

pub struct ProjectCategory;

impl ResourceKind for ProjectCategory {
    type State = ProjectCategoryState;
    type Payload = ProjectCategoryPayload;
    type Model = ProjectCategoryModel;
    const TYPE_NAME: &'static str = "tracker_project_category";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectCategoryState {
    pub id: Value<String>,
    pub name: Value<String>,
    pub description: Value<String>,
}

pub fn build_payload(
    state: &ProjectCategoryState,
    diags: &mut Diagnostics,
) -> Option<ProjectCategoryPayload> {
    let name = required(&state.name, "name", diags)?;
    Some(ProjectCategoryPayload {
        name,
        description: state.description.as_known().cloned(),
    })
}

pub fn map_to_state(
    model: ProjectCategoryModel,
    state: &mut ProjectCategoryState,
    _diags: &mut Diagnostics,
) {
    state.id = Value::known(model.id);
    state.name = Value::known(model.name);
    state.description = Value::from_option(model.description);
}

pub fn hooks(client: ProjectCategoryClient) -> CrudHooks<ProjectCategory> {
    CrudHooks::<ProjectCategory>::new()
        .build_payload(build_payload)
        .map_to_state(map_to_state)
        .extract_id(|state: &ProjectCategoryState| state.id.as_str().to_string())
        .create({
            let client = client.clone();
            move |ctx, payload| {
                let client = client.clone();
                async move { client.create(&ctx, payload).await }
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
        .delete(move |ctx: OpContext, id: String, _state: &ProjectCategoryState| {
            let client = client.clone();
            async move { client.delete(&ctx, &id).await }
        })
        .treat_delete_404_as_success(true)
}

pub fn list_hooks(
    client: ProjectCategoryClient,
) -> ListHooks<ProjectCategoryModel, ProjectCategoryState> {
    ListHooks::unpaged(move |ctx: OpContext| {
        let client = client.clone();
        async move { all_items("list tracker_project_category", client.list(&ctx).await) }
    })
    .key_of(|model: &ProjectCategoryModel| model.id.clone())
    .map_to_out(|model: ProjectCategoryModel, diags: &mut Diagnostics| {
        listed(model, diags, map_to_state)
    })
}
