//! Homelet - property listing manager with a step-by-step creation wizard.
//!
//! The listing domain (drafts, validation, wizard steps, the persisted
//! catalog) lives in [`listing`]; the terminal UI sits on top of it.

pub mod app;
pub mod config;
pub mod listing;
pub mod logging;
pub mod ui;
