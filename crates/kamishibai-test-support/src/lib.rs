//! Shared test fakes and utilities for the Kamishibai player.

mod audio;
mod clock;
mod presentation;
mod scenario;

pub use audio::{AudioOp, RecordingAudio};
pub use clock::FixedClock;
pub use presentation::{PresentationOp, RecordingPresentation};
pub use scenario::{FailingScenarioSource, StaticScenarioSource, scenario_from_json};
