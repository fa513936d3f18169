/// Initializes structured logging for binaries built on the engine.
///
/// - **Filtering**: controlled by `RUST_LOG`, defaulting to `warn` when unset
/// - **Format**: compact single-line events without module targets
/// - **Output**: stderr, so stdout stays free for command output
///
/// Runner spans are named after the operation (`create`, `read`, ...) and
/// carry a `resource` field, so `RUST_LOG=crud_engine=debug` shows each step.
///
/// # Example
///
/// ```ignore
/// crud_engine::tracing::setup_tracing();
/// tracing::info!("provider configured");
/// ```
pub fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
