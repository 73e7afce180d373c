//! Cluster client wiring for reef.
//!
//! Ties the subsystems together:
//!
//! - [`ClusterTopology`] — the configuration provider: accepts proposed
//!   bucket configs, keeps the current [`ClusterConfig`](reef_types::ClusterConfig)
//!   snapshot, and untaints buckets whose topology has settled.
//! - [`ClusterClient`] — owns the facade, topology, refresher, and
//!   observer, and exposes the client-facing operations.

mod client;
mod topology;


pub use client::{ClientConfig, ClusterClient};
pub use topology::ClusterTopology;
