//! Kamishibai — Scenario context.
//!
//! Responsible for the scene data model, loading scenario packs from their
//! source, content hashing, and resolving asset references to served paths.

pub mod application;
pub mod domain;
