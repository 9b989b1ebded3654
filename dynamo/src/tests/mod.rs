//! Acceptance tests for the dispatch engine
//!
//! These modules exercise whole configurations: registry setup, signature
//! submission, compilation and calls, the way a host runtime drives them.

mod test_acceptance_conversions;
mod test_concurrent_calls;

/// Route setup logging to the test output; filter with `RUST_LOG`
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
