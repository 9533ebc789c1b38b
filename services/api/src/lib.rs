//! services/api/src/lib.rs
//!
//! The library crate behind the `api` and `openapi` binaries: adapters for
//! the external services, the generation pipeline, the retry policy, the
//! question-prefetch cache, and the axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prefetch;
pub mod retry;
pub mod web;
