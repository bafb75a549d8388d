//! Workflow Builder - terminal editor for multi-step workflows
//!
//! Steps are added from a palette, ordered on a canvas, configured through a
//! per-type dialog and saved as one snapshot to the workflow server.

pub mod api;
pub mod app;
pub mod config;
pub mod editor;
pub mod logging;
pub mod types;
pub mod ui;
