//! Durability observer.
//!
//! Verifies that a mutation (or deletion) has reached the required number
//! of replicas and/or on-disk persistence before a caller's write is
//! acknowledged:
//!
//! - [`PersistTo`] / [`ReplicateTo`] — the durability criterion.
//! - [`ObserveItem`] — commutative-monoid aggregate of per-node outcomes.
//! - [`DurabilityObserver`] — fan-out to master and replicas, repeated
//!   with backoff until the criterion is satisfied.
//! - [`Delay`] / [`RetryStrategy`] — backoff schedule and error policy.

mod criteria;
mod delay;
mod error;
mod item;
mod observer;
mod retry;


pub use criteria::{PersistTo, ReplicateTo};
pub use delay::{Delay, ExponentialDelay, FixedDelay};
pub use error::ObserveError;
pub use item::ObserveItem;
pub use observer::DurabilityObserver;
pub use retry::{BestEffortRetry, FailFastRetry, RetryStrategy};
