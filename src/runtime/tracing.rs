/// Initializes the tracing/logging infrastructure for the application.
///
/// Verbosity is controlled with `RUST_LOG`:
/// - `RUST_LOG=info` - Store operations and notifications
/// - `RUST_LOG=debug` - Every request sent and answered
/// - `RUST_LOG=cart_sync::notify=info` - Notifications only
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
