//! Display model implementations for table and JSON output

mod cache;
mod workout;

pub use cache::{CacheStatusDisplay, FetchDisplay, GenerationDisplay};
pub use workout::WorkoutDisplay;
