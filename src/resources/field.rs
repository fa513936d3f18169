//! `tracker_field`: custom fields.
//!
//! Fields differ from the other resources in three ways:
//!
//! * reads go through the search endpoint with bounded polling, since a new
//!   field is not searchable straight away;
//! * update answers 204 with no body, so the adapter echoes the request back
//!   as a provisional model and a post-update read replaces it;
//! * permanent delete answers 303, and `trash_on_destroy` switches to the
//!   restorable trash call instead.

use super::{listed, page_of, required};
use crate::clients::FieldClient;
use crate::model::{FieldModel, FieldPayload};
use crud_engine::{CrudHooks, Diagnostics, ListHooks, OpContext, ResourceKind, Value};
use serde::Serialize;

pub struct Field;

impl ResourceKind for Field {
    type State = FieldState;
    type Payload = FieldPayload;
    type Model = FieldModel;
    const TYPE_NAME: &'static str = "tracker_field";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldState {
    pub id: Value<String>,
    pub name: Value<String>,
    pub description: Value<String>,
    pub field_type: Value<String>,
    pub searcher_key: Value<String>,
    /// Local only. When set, destroy moves the field to the trash.
    pub trash_on_destroy: bool,
}

pub fn build_payload(state: &FieldState, diags: &mut Diagnostics) -> Option<FieldPayload> {
    let name = required(&state.name, "name", diags);
    let field_type = required(&state.field_type, "field_type", diags);
    Some(FieldPayload {
        name: name?,
        description: state.description.as_known().cloned(),
        field_type: Some(field_type?),
        searcher_key: state.searcher_key.as_known().cloned(),
    })
}

pub fn map_to_state(model: FieldModel, state: &mut FieldState, diags: &mut Diagnostics) {
    if model.id.is_empty() {
        diags.add_error(
            "Unexpected tracker_field response",
            "The response does not identify the field.",
        );
        return;
    }
    let field_type = model.field_type().map(str::to_string);
    state.id = Value::known(model.id);
    state.name = Value::known(model.name);
    state.description = Value::from_option(model.description);
    state.field_type = Value::from_option(field_type);
    state.searcher_key = Value::from_option(model.searcher_key);
}

/// The model an update is assumed to produce until it is read back.
fn echoed(id: &str, payload: &FieldPayload) -> FieldModel {
    FieldModel {
        id: id.to_string(),
        name: payload.name.clone(),
        description: payload.description.clone(),
        schema: None,
        searcher_key: payload.searcher_key.clone(),
    }
}

pub fn hooks(client: FieldClient) -> CrudHooks<Field> {
    CrudHooks::<Field>::new()
        .build_payload(build_payload)
        .map_to_state(map_to_state)
        .extract_id(|state: &FieldState| state.id.as_str().to_string())
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
                async move { client.find(&ctx, &id).await }
            }
        })
        .update({
            let client = client.clone();
            move |ctx, id: String, payload: FieldPayload| {
                let client = client.clone();
                let provisional = echoed(&id, &payload);
                async move {
                    client
                        .update(&ctx, &id, payload)
                        .await
                        .map(|()| provisional)
                }
            }
        })
        .post_update({
            let client = client.clone();
            move |ctx, updated: FieldModel| {
                let client = client.clone();
                async move { client.find(&ctx, &updated.id).await }
            }
        })
        .delete(move |ctx: OpContext, id: String, state: &FieldState| {
            let client = client.clone();
            let trash = state.trash_on_destroy;
            async move {
                if trash {
                    client.trash(&ctx, &id).await
                } else {
                    client.delete(&ctx, &id).await
                }
            }
        })
        .acceptable_delete_statuses(vec![303])
        .treat_delete_404_as_success(true)
}

pub fn list_hooks(client: FieldClient) -> ListHooks<FieldModel, FieldState> {
    ListHooks::paged(move |ctx: OpContext, start_at: usize, size: usize| {
        let client = client.clone();
        async move { page_of("list tracker_field", client.search(&ctx, start_at, size).await) }
    })
    .key_of(|model: &FieldModel| model.id.clone())
    .map_to_out(|model: FieldModel, diags: &mut Diagnostics| listed(model, diags, map_to_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldSchema;
    use pretty_assertions::assert_eq;

    const SELECT: &str = "com.atlassian.jira.plugin.system.customfieldtypes:select";

    #[test]
    fn test_build_payload_requires_type() {
        let state = FieldState {
            name: Value::known("Severity".into()),
            ..FieldState::default()
        };
        let mut diags = Diagnostics::new();
        assert!(build_payload(&state, &mut diags).is_none());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_echoed_model_mirrors_request() {
        let payload = FieldPayload {
            name: "Severity".into(),
            description: Some("Customer impact".into()),
            field_type: Some(SELECT.into()),
            searcher_key: None,
        };
        let model = echoed("customfield_10050", &payload);
        assert_eq!(model.id, "customfield_10050");
        assert_eq!(model.name, "Severity");
        assert_eq!(model.description.as_deref(), Some("Customer impact"));
    }

    #[test]
    fn test_map_to_state_reads_type_from_schema() {
        let model = FieldModel {
            id: "customfield_10050".into(),
            name: "Severity".into(),
            schema: Some(FieldSchema {
                kind: "option".into(),
                custom: Some(SELECT.into()),
            }),
            ..FieldModel::default()
        };
        let mut state = FieldState {
            trash_on_destroy: true,
            ..FieldState::default()
        };
        map_to_state(model, &mut state, &mut Diagnostics::new());
        assert_eq!(state.field_type.as_str(), SELECT);
        assert!(state.trash_on_destroy);
    }
}
