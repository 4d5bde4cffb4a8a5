//! `credit-risk` library crate.
//!
//! The binary (`crisk`) is a thin wrapper around this library so that:
//!
//! - scoring logic is testable without spawning processes
//! - the engine can be embedded in a service that owns its own transport
//! - code stays easy to navigate as the project grows
//!
//! Request flow: `features` builds a `FeatureVector`, `models` turns it into a probability
//! and exact per-feature attributions, `policy` maps both onto a score, tier and verdict.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod finance;
pub mod io;
pub mod logging;
pub mod models;
pub mod policy;
pub mod report;
