//! Shared fixtures for the integration tests and benchmarks.

pub mod lst;

/// Registers the JavaScript kinds once and returns.
pub fn setup() {
    lst_js::install();
}
