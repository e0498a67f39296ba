//! respnav library crate.
//!
//! This library provides the core functionality for respnav, including:
//! - Turn location and response target indexing over a host document
//! - Mutation watching with debounced, deduplicated list rebuilds
//! - Scroll navigation with highlight and code block markers
//! - Persisted preferences and configuration
//! - Terminal UI components

pub mod app;
pub mod config;
pub mod conversation;
pub mod dom;
pub mod engine;
pub mod error;
pub mod generation;
pub mod logging;
pub mod prefs;
pub mod scroll;
pub mod selection;
pub mod sync;
pub mod timers;
pub mod ui;
pub mod watcher;
