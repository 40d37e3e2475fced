//! Entity and tile classification policy for Worldmirror
//!
//! Decides, per type, its group, track distance, and whether capture is
//! enabled at all. The policy consults local config, then the remote's
//! pushed distances, then a fixed default table; an unrecognized type is
//! never an error, it classifies to the unknown group with distance -1.

pub mod careers;
pub mod config;
pub mod policy;
pub mod registry;

pub use careers::{career_for, CareerError};
pub use config::{ClassificationConfig, TrackDistanceMode};
pub use policy::{ClassificationPolicy, ClassificationResult};
pub use registry::{Category, TypeRegistry};
