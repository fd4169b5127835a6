//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TraversalState`: Lifecycle of a run (running, stopped, halted, exhausted)
//! - `TraversalControl`: Shared handle through which workers observe and change it
//! - `VisitedSet`: URLs already claimed by a worker

mod traversal_state;
mod visited;

// Re-export main types
pub use traversal_state::{TraversalControl, TraversalState};
pub use visited::VisitedSet;
