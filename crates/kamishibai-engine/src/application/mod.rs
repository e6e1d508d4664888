//! Playback orchestration.

pub mod audio;
pub mod boot;
pub mod command_handlers;
pub mod query_handlers;
pub mod session;
pub mod stage;
pub mod transitions;
