//! Content models for the salon site.
//!
//! Field names serialize in camelCase to match the JSON files the site reads.

mod items;
mod published;
mod section;
mod snapshot;

pub use items::*;
pub use published::*;
pub use section::*;
pub use snapshot::*;
