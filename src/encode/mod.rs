//! Getting finished images out: PNG/data-URL export and gallery persistence.

/// PNG bytes, data URLs and download file names.
pub mod export;
/// Gallery storage trait and built-in sinks.
pub mod gallery;
