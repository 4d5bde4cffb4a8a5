//! Tree-ensemble model: validated forest, inference and exact attribution.
//!
//! All three operate on the same immutable [`TrainedForest`], so one loaded artifact can
//! serve any number of concurrent requests without locking.

pub mod explain;
pub mod forest;
pub mod predict;

pub use explain::*;
pub use forest::*;
pub use predict::*;
