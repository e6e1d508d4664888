//! Scenario loading and asset resolution.

pub mod assets;
pub mod loader;
