//! Kamishibai Core — shared abstractions for the scene player.
//!
//! This crate defines the seams every other crate depends on: the error
//! taxonomy, configuration, the presentation and audio surfaces, and input
//! commands. It contains no infrastructure code.

pub mod audio;
pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod presentation;
