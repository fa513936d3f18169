use crud_engine::mock::{recording_classifier, ApiCall, CallLog, MockApi, RecordingState};
use crud_engine::{
    ApiError, ApiOutcome, CrudHooks, CrudRunner, Diagnostics, OpContext, Operation, ResourceKind,
    ResponseMeta, Value,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq)]
struct WidgetState {
    id: Value<String>,
    name: Value<String>,
    /// Local-only; the remote API never echoes it.
    trash_on_destroy: bool,
}

#[derive(Debug, Clone)]
struct WidgetPayload {
    name: String,
}

#[derive(Debug, Clone)]
struct WidgetModel {
    id: String,
    name: String,
}

struct Widget;

impl ResourceKind for Widget {
    type State = WidgetState;
    type Payload = WidgetPayload;
    type Model = WidgetModel;
    const TYPE_NAME: &'static str = "tracker_widget";
}

fn widget(id: &str, name: &str) -> WidgetModel {
    WidgetModel {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn planned(name: &str) -> WidgetState {
    WidgetState {
        id: Value::Null,
        name: Value::known(name.to_string()),
        trash_on_destroy: false,
    }
}

fn tracked(id: &str, name: &str) -> WidgetState {
    WidgetState {
        id: Value::known(id.to_string()),
        name: Value::known(name.to_string()),
        trash_on_destroy: true,
    }
}

/// Hooks without remote calls; `MockApi::wire` supplies those.
///
/// The builder warns on upper-case names and the mapper rejects models named `"bad"`.
fn base_hooks(log: &CallLog) -> CrudHooks<Widget> {
    let map_log = log.clone();
    CrudHooks::<Widget>::new()
        .build_payload(|state: &WidgetState, diags: &mut Diagnostics| {
            let Some(name) = state.name.as_known() else {
                diags.add_error("Missing name", "name must be known before it can be sent");
                return None;
            };
            if name.chars().any(char::is_uppercase) {
                diags.add_warning("Name will be lower-cased", "the service stores names in lower case");
            }
            Some(WidgetPayload { name: name.clone() })
        })
        .extract_id(|state: &WidgetState| state.id.as_str().to_string())
        .map_to_state(move |model: WidgetModel, state: &mut WidgetState, diags: &mut Diagnostics| {
            map_log.record("map");
            if model.name == "bad" {
                diags.add_error("Unexpected name", "the service returned an invalid name");
                return;
            }
            state.id = Value::known(model.id);
            state.name = Value::known(model.name);
        })
}

fn runner(hooks: CrudHooks<Widget>, log: &CallLog) -> CrudRunner<Widget> {
    CrudRunner::new(hooks).with_classifier(recording_classifier(log.clone()))
}

fn setup() -> (CallLog, MockApi<WidgetModel>) {
    let log = CallLog::new();
    let api = MockApi::new(log.clone());
    (log, api)
}

#[tokio::test]
async fn test_create_keeps_build_warning_on_success() {
    let (log, api) = setup();
    api.expect(ApiCall::Create).return_ok(widget("10001", "Alpha"), 201);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(planned("Alpha"), log.clone());
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert!(!diags.has_error(), "unexpected errors: {diags:?}");
    assert_eq!(diags.warning_count(), 1);
    assert_eq!(access.set_state_calls, 1);
    assert_eq!(access.tracked().map(|s| s.id.as_str()), Some("10001"));
    assert_eq!(log.with_prefix("classify:"), vec!["create resource"]);
    api.verify();
}

#[tokio::test]
async fn test_read_404_removes_state_without_classifying() {
    let (log, api) = setup();
    api.expect(ApiCall::Read).return_status(404);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_tracked(tracked("10001", "alpha"), log.clone());
    let diags = runner.read(&OpContext::new(), &mut access).await;

    assert!(diags.is_empty());
    assert_eq!(access.remove_calls, 1);
    assert!(access.tracked().is_none());
    assert_eq!(log.count("map"), 0);
    assert_eq!(log.count_prefix("classify:"), 0);
    assert_eq!(access.set_state_calls, 0);
    api.verify();
}

#[tokio::test]
async fn test_read_404_short_circuits_even_with_transport_error() {
    let (log, api) = setup();
    api.expect(ApiCall::Read).return_outcome(
        ApiOutcome::status_only(ResponseMeta::new(404)).with_error(ApiError::Decode("empty body".into())),
    );
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_tracked(tracked("10001", "alpha"), log.clone());
    let diags = runner.read(&OpContext::new(), &mut access).await;

    assert!(diags.is_empty());
    assert_eq!(access.remove_calls, 1);
}

#[tokio::test]
async fn test_failed_post_create_hook_skips_mapping() {
    let (log, api) = setup();
    api.expect(ApiCall::Create).return_ok(widget("10001", "alpha"), 201);
    api.expect(ApiCall::PostCreate).return_status(500);
    let hooks = api.wire_post(api.wire(base_hooks(&log)), ApiCall::PostCreate);
    let runner = runner(hooks, &log);

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert_eq!(log.with_prefix("classify:"), vec!["create resource", "post-create hook"]);
    assert_eq!(diags.error_count(), 1);
    assert_eq!(log.count("map"), 0);
    assert_eq!(access.set_state_calls, 0);
    api.verify();
}

#[tokio::test]
async fn test_successful_post_create_hook_result_is_mapped() {
    let (log, api) = setup();
    api.expect(ApiCall::Create).return_ok(widget("10001", ""), 201);
    api.expect(ApiCall::PostCreate).return_ok(widget("10001", "alpha"), 200);
    let hooks = api.wire_post(api.wire(base_hooks(&log)), ApiCall::PostCreate);
    let runner = runner(hooks, &log);

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert!(diags.is_empty());
    assert_eq!(access.tracked().map(|s| s.name.as_str()), Some("alpha"));
    assert_eq!(
        log.entries(),
        vec![
            "get_plan",
            "api:create",
            "classify:create resource",
            "api:post_create",
            "classify:post-create hook",
            "map",
            "set_state",
        ]
    );
}

#[tokio::test]
async fn test_delete_404_is_success_when_opted_in() {
    let (log, api) = setup();
    api.expect(ApiCall::Delete).return_status(404);
    let runner = runner(api.wire(base_hooks(&log)).treat_delete_404_as_success(true), &log);

    let mut access = RecordingState::with_tracked(tracked("10001", "alpha"), log.clone());
    let diags = runner.delete(&OpContext::new(), &mut access).await;

    assert!(!diags.has_error());
    assert_eq!(log.with_prefix("classify:"), vec!["delete resource"]);
}

#[tokio::test]
async fn test_delete_404_fails_without_opt_in() {
    let (log, api) = setup();
    api.expect(ApiCall::Delete).return_status(404);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_tracked(tracked("10001", "alpha"), log.clone());
    let diags = runner.delete(&OpContext::new(), &mut access).await;

    assert_eq!(diags.error_count(), 1);
    assert!(diags.iter().next().unwrap().detail.contains("HTTP status: 404"));
}

#[tokio::test]
async fn test_delete_status_override_accepts_redirect() {
    let (log, api) = setup();
    api.expect(ApiCall::Delete).return_status(303);
    let hooks = api.wire(base_hooks(&log)).acceptable_delete_statuses(vec![303]);
    let runner = runner(hooks, &log);

    let mut access = RecordingState::with_tracked(tracked("10001", "alpha"), log.clone());
    assert!(runner.delete(&OpContext::new(), &mut access).await.is_empty());
}

#[tokio::test]
async fn test_delete_hook_sees_local_only_fields() {
    let log = CallLog::new();
    let hooks = base_hooks(&log).delete(|_ctx, id: String, state: &WidgetState| {
        let status = if state.trash_on_destroy { 202 } else { 204 };
        assert_eq!(id, "10001");
        async move { ApiOutcome::status_only(ResponseMeta::new(status)) }
    });
    let runner = runner(hooks, &log);

    let mut access = RecordingState::with_tracked(tracked("10001", "alpha"), log.clone());
    assert!(runner.delete(&OpContext::new(), &mut access).await.is_empty());
}

#[tokio::test]
async fn test_mapping_failure_never_persists_on_create() {
    let (log, api) = setup();
    api.expect(ApiCall::Create).return_ok(widget("10001", "bad"), 201);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert!(diags.has_error());
    assert_eq!(log.count("map"), 1);
    assert_eq!(access.set_state_calls, 0);
}

#[tokio::test]
async fn test_mapping_failure_never_persists_on_update() {
    let (log, api) = setup();
    api.expect(ApiCall::Update).return_ok(widget("10001", "bad"), 200);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(tracked("10001", "alpha"), log.clone());
    let diags = runner.update(&OpContext::new(), &mut access).await;

    assert!(diags.has_error());
    assert_eq!(access.set_state_calls, 0);
}

#[tokio::test]
async fn test_mapping_failure_never_persists_on_import() {
    let (log, api) = setup();
    api.expect(ApiCall::Read).return_ok(widget("10001", "bad"), 200);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::empty(log.clone());
    let diags = runner.import(&OpContext::new(), "10001", &mut access).await;

    assert!(diags.has_error());
    assert_eq!(access.set_state_calls, 0);
    assert!(access.tracked().is_none());
}

#[tokio::test]
async fn test_update_uses_plan_and_maps_result() {
    let (log, api) = setup();
    api.expect(ApiCall::Update).return_ok(widget("10001", "beta"), 200);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(tracked("10001", "beta"), log.clone());
    let diags = runner.update(&OpContext::new(), &mut access).await;

    assert!(diags.is_empty());
    assert_eq!(access.get_plan_calls, 1);
    assert_eq!(access.get_state_calls, 0);
    let state = access.tracked().cloned().unwrap();
    assert_eq!(state.name.as_str(), "beta");
    assert!(state.trash_on_destroy, "local-only field must survive mapping");
}

#[tokio::test]
async fn test_update_without_identifier_makes_no_call() {
    let (log, api) = setup();
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    let diags = runner.update(&OpContext::new(), &mut access).await;

    assert!(diags.has_error());
    assert_eq!(api.calls(ApiCall::Update), 0);
}

#[tokio::test]
async fn test_missing_hooks_fail_before_any_io() {
    let (log, api) = setup();
    // No build_payload, so create is unsupported; no delete, so delete is unsupported.
    let hooks = CrudHooks::<Widget>::new()
        .create(|_ctx, _payload| async { ApiOutcome::failed(ApiError::Canceled) })
        .map_to_state(|_model, _state, _diags| {});
    let runner = runner(hooks, &log);
    assert!(!runner.supports(Operation::Create));

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    let diags = runner.create(&OpContext::new(), &mut access).await;
    assert_eq!(diags.error_count(), 1);
    let diag = diags.iter().next().unwrap();
    assert!(diag.summary.contains("does not support create"));
    assert!(diag.detail.contains("build_payload"));

    let diags = runner.delete(&OpContext::new(), &mut access).await;
    assert!(diags.has_error());

    assert_eq!(access.get_plan_calls, 0);
    assert_eq!(access.get_state_calls, 0);
    assert!(log.entries().is_empty());
    api.verify();
}

#[tokio::test]
async fn test_accessor_failure_stops_before_remote_call() {
    let (log, api) = setup();
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone()).failing_get();
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert!(diags.has_error());
    assert_eq!(api.calls(ApiCall::Create), 0);
}

#[tokio::test]
async fn test_build_error_stops_before_remote_call() {
    let (log, api) = setup();
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(WidgetState::default(), log.clone());
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert_eq!(diags.error_count(), 1);
    assert_eq!(api.calls(ApiCall::Create), 0);
}

#[tokio::test]
async fn test_set_state_failure_is_returned() {
    let (log, api) = setup();
    api.expect(ApiCall::Create).return_ok(widget("10001", "alpha"), 201);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone()).failing_set();
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert!(diags.has_error());
    assert_eq!(access.set_state_calls, 1);
}

#[tokio::test]
async fn test_import_404_is_a_hard_failure() {
    let (log, api) = setup();
    api.expect(ApiCall::Read).return_status(404);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::empty(log.clone());
    let diags = runner.import(&OpContext::new(), "10001", &mut access).await;

    assert_eq!(diags.error_count(), 1);
    assert_eq!(log.with_prefix("classify:"), vec!["import resource"]);
    assert_eq!(access.remove_calls, 0);
    assert_eq!(access.set_state_calls, 0);
}

#[tokio::test]
async fn test_import_maps_into_fresh_state() {
    let (log, api) = setup();
    api.expect(ApiCall::Read).return_ok(widget("10001", "alpha"), 200);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::empty(log.clone());
    let diags = runner.import(&OpContext::new(), "10001", &mut access).await;

    assert!(diags.is_empty());
    let state = access.tracked().cloned().unwrap();
    assert_eq!(state.id.as_str(), "10001");
    assert!(!state.trash_on_destroy);
}

#[tokio::test]
async fn test_create_accepts_any_2xx_despite_override() {
    let (log, api) = setup();
    api.expect(ApiCall::Create).return_ok(widget("10001", "alpha"), 200);
    let runner = runner(api.wire(base_hooks(&log)).acceptable_create_statuses(vec![201]), &log);

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    assert!(runner.create(&OpContext::new(), &mut access).await.is_empty());
}

#[tokio::test]
async fn test_success_without_body_is_an_error() {
    let (log, api) = setup();
    api.expect(ApiCall::Create).return_status(201);
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert_eq!(diags.error_count(), 1);
    assert_eq!(access.set_state_calls, 0);
}

#[tokio::test]
async fn test_transport_error_on_success_status_fails() {
    let (log, api) = setup();
    api.expect(ApiCall::Read).return_outcome(
        ApiOutcome::ok(widget("10001", "alpha"), ResponseMeta::new(200))
            .with_error(ApiError::Timeout("body read".into())),
    );
    let runner = runner(api.wire(base_hooks(&log)), &log);

    let mut access = RecordingState::with_tracked(tracked("10001", "alpha"), log.clone());
    let diags = runner.read(&OpContext::new(), &mut access).await;

    assert!(diags.has_error());
    assert_eq!(access.set_state_calls, 0);
    assert_eq!(access.remove_calls, 0);
}

#[tokio::test(start_paused = true)]
async fn test_operation_timeout_covers_the_whole_call() {
    let log = CallLog::new();
    let hooks = base_hooks(&log).create(|_ctx, _payload| async {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        ApiOutcome::ok(widget("10001", "alpha"), ResponseMeta::new(201))
    });
    let runner = runner(hooks, &log).with_operation_timeout(Duration::from_secs(5));

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    let diags = runner.create(&OpContext::new(), &mut access).await;

    assert_eq!(diags.error_count(), 1);
    let diag = diags.iter().next().unwrap();
    assert!(diag.summary.contains("context deadline exceeded"));
    assert!(diag.detail.contains("deadline was exceeded"));
    assert_eq!(access.set_state_calls, 0);
}

#[tokio::test]
async fn test_cancelled_context_reports_cancellation() {
    let log = CallLog::new();
    let hooks = base_hooks(&log).create(|_ctx, _payload| async {
        ApiOutcome::ok(widget("10001", "alpha"), ResponseMeta::new(201))
    });
    let runner = runner(hooks, &log);
    let ctx = OpContext::new();
    ctx.cancel();

    let mut access = RecordingState::with_plan(planned("alpha"), log.clone());
    let diags = runner.create(&ctx, &mut access).await;

    assert!(diags.iter().next().unwrap().detail.contains("canceled by the caller"));
}
