//! Pigeonhole - terminal client for GitHub notifications
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod github;
pub mod pipeline;
pub mod tui;
pub mod util;
