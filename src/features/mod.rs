//! Feature engineering.
//!
//! - `schema`: the fixed, versioned 28-slot layout and the typed `FeatureVector`
//! - `engineer`: record parsing and derivation of every slot

pub mod engineer;
pub mod schema;

pub use engineer::*;
pub use schema::*;
