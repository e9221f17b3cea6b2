//! CLI command implementations

pub mod health;
pub mod predict;
pub mod settings;
