//! Tracked-asset lifecycle.
//!
//! - [`registry`] - Which assets have a live collector; start, stop, shutdown
//! - [`collector`] - The per-asset polling task
//!
//! A collector is `Running` from registration until its cancellation token
//! fires, then `Stopped` for good. There is no pause and no automatic restart.

pub mod collector;
pub mod errors;
pub mod registry;


pub use collector::{run_collector, CollectorConfig};
pub use errors::TrackingError;
pub use registry::TrackingRegistry;
