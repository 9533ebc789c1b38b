//! services/api/src/adapters/mod.rs
//!
//! Concrete implementations of the `core` crate's ports, plus the
//! provider-composition and normalization helpers they share.

pub mod anthropic;
pub mod db;
pub mod generation;
pub mod normalize;
pub mod openai_llm;
pub mod questions;
pub mod supadata;
