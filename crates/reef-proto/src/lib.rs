//! Protocol surface consumed by the reef client cores.
//!
//! This crate provides:
//!
//! - [`Payload`] — a release-tracked response buffer with an external
//!   leak probe ([`PayloadCounter`]).
//! - [`message`] — request/response types and protocol status enums.
//! - [`ClusterFacade`] — the async seam through which all requests are
//!   dispatched to the cluster.
//! - [`MockFacade`] — a scriptable in-memory facade for tests.

mod error;
mod facade;
pub mod message;
pub mod mock;
mod payload;

pub use error::FacadeError;
pub use facade::ClusterFacade;
pub use message::{
    GetBucketConfigRequest, GetBucketConfigResponse, GetClusterConfigResponse, KeyValueStatus,
    ObserveRequest, ObserveResponse, ObserveStatus, ResponseStatus,
};
pub use mock::MockFacade;
pub use payload::{Payload, PayloadCounter};
