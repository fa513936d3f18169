//! `tracker_work_type`: global work types (issue types).
//!
//! Project-scoped work types belong to their project and are left out of
//! listings.

use super::{all_items, listed, required};
use crate::clients::WorkTypeClient;
use crate::model::{WorkTypeModel, WorkTypePayload};
use crud_engine::{CrudHooks, Diagnostics, ListHooks, OpContext, ResourceKind, Value};
use serde::Serialize;

pub struct WorkType;

impl ResourceKind for WorkType {
    type State = WorkTypeState;
    type Payload = WorkTypePayload;
    type Model = WorkTypeModel;
    const TYPE_NAME: &'static str = "tracker_work_type";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkTypeState {
    pub id: Value<String>,
    pub name: Value<String>,
    pub description: Value<String>,
    /// `0` for standard work types, `-1` for subtasks.
    pub hierarchy_level: Value<i64>,
    pub avatar_id: Value<i64>,
}

pub fn build_payload(state: &WorkTypeState, diags: &mut Diagnostics) -> Option<WorkTypePayload> {
    let name = required(&state.name, "name", diags)?;
    Some(WorkTypePayload {
        name,
        description: state.description.as_known().cloned(),
        hierarchy_level: state.hierarchy_level.as_known().copied(),
        avatar_id: state.avatar_id.as_known().copied(),
    })
}

pub fn map_to_state(model: WorkTypeModel, state: &mut WorkTypeState, _diags: &mut Diagnostics) {
    state.id = Value::known(model.id);
    state.name = Value::known(model.name);
    state.description = Value::from_option(model.description);
    state.hierarchy_level = Value::known(model.hierarchy_level);
    state.avatar_id = Value::from_option(model.avatar_id);
}

pub fn hooks(client: WorkTypeClient) -> CrudHooks<WorkType> {
    CrudHooks::<WorkType>::new()
        .build_payload(build_payload)
        .map_to_state(map_to_state)
        .extract_id(|state: &WorkTypeState| state.id.as_str().to_string())
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
        .delete(move |ctx: OpContext, id: String, _state: &WorkTypeState| {
            let client = client.clone();
            async move { client.delete(&ctx, &id).await }
        })
        .treat_delete_404_as_success(true)
}

pub fn list_hooks(client: WorkTypeClient) -> ListHooks<WorkTypeModel, WorkTypeState> {
    ListHooks::unpaged(move |ctx: OpContext| {
        let client = client.clone();
        async move { all_items("list tracker_work_type", client.list(&ctx).await) }
    })
    .filter(WorkTypeModel::is_global)
    .key_of(|model: &WorkTypeModel| model.id.clone())
    .map_to_out(|model: WorkTypeModel, diags: &mut Diagnostics| listed(model, diags, map_to_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkTypeScope;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_payload_requires_name() {
        let mut diags = Diagnostics::new();
        assert!(build_payload(&WorkTypeState::default(), &mut diags).is_none());
        assert!(diags.has_error());
    }

    #[test]
    fn test_build_payload_carries_known_values_only() {
        let state = WorkTypeState {
            name: Value::known("Incident".into()),
            hierarchy_level: Value::known(0),
            description: Value::Unknown,
            ..WorkTypeState::default()
        };
        let mut diags = Diagnostics::new();
        let payload = build_payload(&state, &mut diags).unwrap();
        assert_eq!(
            payload,
            WorkTypePayload {
                name: "Incident".into(),
                description: None,
                hierarchy_level: Some(0),
                avatar_id: None,
            }
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_map_to_state_fills_every_remote_field() {
        let model = WorkTypeModel {
            id: "10004".into(),
            name: "Incident".into(),
            description: Some("Service outage".into()),
            hierarchy_level: -1,
            avatar_id: Some(10318),
            scope: None,
        };
        let mut state = WorkTypeState::default();
        map_to_state(model, &mut state, &mut Diagnostics::new());
        assert_eq!(state.id.as_str(), "10004");
        assert_eq!(state.hierarchy_level, Value::known(-1));
        assert_eq!(state.avatar_id, Value::known(10318));
    }

    #[test]
    fn test_scoped_work_types_are_not_global() {
        let scoped = WorkTypeModel {
            scope: Some(WorkTypeScope {
                kind: "PROJECT".into(),
            }),
            ..WorkTypeModel::default()
        };
        assert!(!scoped.is_global());
        assert!(WorkTypeModel::default().is_global());
    }
}
