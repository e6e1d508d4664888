//! Kamishibai — Scene engine.
//!
//! Responsible for playing a scenario: flag bookkeeping, condition
//! evaluation, text paging, audio channels, fade and flash transitions, and
//! the playback session that ties them to input.

pub mod application;
pub mod domain;
