//! Bootstrap a local Qdrant container and load embedded book metadata into it.
//!
//! The run is strictly staged: container engine reachable, then a container
//! for the store image running, then the collection loaded at most once.

pub mod config;
pub mod dataset;
pub mod docker;
pub mod embed;
mod error;
pub mod pipeline;
pub mod store;

pub use error::{Error, Result};
