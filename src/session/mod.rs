//! Debounced, single-flight execution of the compositing pipelines.

/// Generic debounced runner with stale-result discarding.
pub mod debounce;
/// Ready-made runners for each tool.
pub mod tools;
