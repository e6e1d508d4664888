//! Session-level domain types.

pub mod commands;
pub mod condition;
pub mod flags;
pub mod pager;
