//! Podvault - podcast search and detail aggregation
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod podcasts;
