//! territory-planner
//!
//! Partitions points of sale into balanced, compact daily routes per
//! salesperson or territory, orders each route and scores it.

pub mod error;
pub mod traits;
pub mod haversine;
pub mod model;
pub mod config;
pub mod validate;
pub mod spatial;
pub mod kmeans;
pub mod subcluster;
pub mod merge;
pub mod balance;
pub mod collision;
pub mod sequence;
pub mod metrics;
pub mod solver;
pub mod reassign;
pub mod store;

pub use error::{Error, Result};
