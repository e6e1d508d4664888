//! Scenario data model.

pub mod condition;
pub mod flag;
pub mod scene;
