//! Client for the hosted caption, hashtag and scene generators.

/// Request/response types, prompt building, reply parsing and the blocking HTTP client.
pub mod ai;
