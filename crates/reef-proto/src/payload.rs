//! Release-tracked response buffers.
//!
//! Every protocol response that carries content owns exactly one
//! [`Payload`]. The payload is a linear value: consuming code inspects it
//! and then releases it exactly once, on every path. Rust ownership is the
//! enforcement mechanism — dropping the payload releases its reference, so
//! early returns, error branches, and cancelled tasks all settle the
//! buffer without extra bookkeeping. [`Payload::release`] exists to make
//! the hand-off explicit at the point where content has been consumed.
//!
//! [`PayloadCounter`] is the external probe: it observes the live
//! reference count without holding a reference itself. A count of zero
//! after an operation settles is the canonical leak check.

use std::str::Utf8Error;
use std::sync::{Arc, Weak};

use bytes::Bytes;

/// A response content buffer holding one live reference.
#[derive(Debug)]
pub struct Payload {
    data: Bytes,
    probe: Arc<()>,
}

impl Payload {
    /// Wrap content bytes into a fresh payload with one live reference.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            probe: Arc::new(()),
        }
    }

    /// An external counter observing this payload's reference count.
    pub fn counter(&self) -> PayloadCounter {
        PayloadCounter {
            probe: Arc::downgrade(&self.probe),
        }
    }

    /// The raw content bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Content decoded as UTF-8.
    pub fn as_utf8(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the payload carries no content.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current live reference count (1 until released).
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.probe)
    }

    /// Release this payload's reference.
    ///
    /// Equivalent to dropping the value; spelled out so consumption sites
    /// read as an explicit hand-off.
    pub fn release(self) {}
}

/// External observer for a [`Payload`]'s reference count.
///
/// Holds only a weak handle, so the counter itself never keeps the buffer
/// alive. Cheap to clone and safe to read after the payload is gone.
#[derive(Debug, Clone)]
pub struct PayloadCounter {
    probe: Weak<()>,
}

impl PayloadCounter {
    /// Live references to the observed payload. Zero once released.
    pub fn ref_count(&self) -> usize {
        self.probe.strong_count()
    }
}
