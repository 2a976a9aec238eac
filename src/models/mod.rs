//! Display models for CLI output
//!
//! Converts store and cache types into table rows and JSON payloads.

pub mod display;

pub use display::{CacheStatusDisplay, FetchDisplay, GenerationDisplay, WorkoutDisplay};
