//! Shared helpers for integration tests that need a real PostgreSQL.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! helpers shared between suites live here and are pulled in with `mod support;`.

pub mod embedded_postgres;

/// Returns true when `SKIP_TEST_CLUSTER` is set to "1", "true", or "yes"
/// (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Prints a skip marker and returns `None` when `SKIP_TEST_CLUSTER` is truthy;
/// otherwise panics so a broken cluster is never mistaken for a pass.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
