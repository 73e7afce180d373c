//! Immutable aggregate of per-node observe outcomes.

use std::fmt;

use reef_proto::{ObserveResponse, ObserveStatus};

use crate::criteria::{PersistTo, ReplicateTo};
use crate::error::ObserveError;

/// Aggregated durability state across observed nodes.
///
/// A commutative monoid: [`ObserveItem::default`] is the identity and
/// [`ObserveItem::add`] combines componentwise (sum on the counters, OR
/// on the master flag). Responses can therefore be folded in whatever
/// order they arrive, and each intermediate aggregate can be checked
/// against the criterion so the scan stops at the first satisfying state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserveItem {
    replicated: u32,
    persisted: u32,
    persisted_master: bool,
}

impl ObserveItem {
    /// Build an aggregate with explicit components.
    pub fn new(replicated: u32, persisted: u32, persisted_master: bool) -> Self {
        Self {
            replicated,
            persisted,
            persisted_master,
        }
    }

    /// Classify one observe response into its aggregate contribution.
    ///
    /// The response content is released on receipt; the observe payload
    /// is not consumed further. CAS values must match the expectation to
    /// make sure the right document revision is being observed — the one
    /// exclusion is a persisted deletion, which reports CAS 0.
    ///
    /// A mismatched CAS on the active copy means the document has been
    /// modified in the meantime and fails the whole operation; on a
    /// replica it merely contributes nothing.
    pub fn from_response(
        id: &str,
        response: ObserveResponse,
        expected_cas: u64,
        remove: bool,
        persist_identifier: ObserveStatus,
        replica_identifier: ObserveStatus,
    ) -> Result<Self, ObserveError> {
        let ObserveResponse {
            observe_status,
            cas,
            master,
            content,
        } = response;
        content.release();

        let valid_cas =
            expected_cas == cas || (remove && cas == 0 && observe_status == persist_identifier);

        if master {
            if !valid_cas {
                return Err(ObserveError::ConcurrentlyModified { id: id.to_string() });
            }
            if observe_status == persist_identifier {
                return Ok(Self::new(0, 1, true));
            }
            return Ok(Self::default());
        }

        if !valid_cas {
            return Ok(Self::default());
        }
        if observe_status == persist_identifier {
            // A persisted replica implies a replicated one.
            Ok(Self::new(1, 1, false))
        } else if observe_status == replica_identifier {
            Ok(Self::new(1, 0, false))
        } else {
            Ok(Self::default())
        }
    }

    /// Combine two aggregates. Associative and commutative.
    pub fn add(self, other: Self) -> Self {
        Self {
            replicated: self.replicated + other.replicated,
            persisted: self.persisted + other.persisted,
            persisted_master: self.persisted_master || other.persisted_master,
        }
    }

    /// True if this aggregate satisfies the given criterion.
    pub fn check(&self, persist_to: PersistTo, replicate_to: ReplicateTo) -> bool {
        let persist_done = match persist_to {
            PersistTo::Master => self.persisted_master,
            _ => self.persisted >= persist_to.value(),
        };
        let replicate_done = self.replicated >= replicate_to.value();
        persist_done && replicate_done
    }
}

impl fmt::Display for ObserveItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "persisted {}", self.persisted)?;
        if self.persisted_master {
            write!(f, " (master)")?;
        }
        write!(f, ", replicated {}", self.replicated)
    }
}
