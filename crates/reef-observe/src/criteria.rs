//! Durability criteria for observed mutations.

/// How many nodes must report the mutation as persisted to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistTo {
    /// No persistence requirement.
    None,
    /// The active copy must have persisted the mutation.
    Master,
    /// One node must have persisted (the active copy counts).
    One,
    /// Two nodes must have persisted.
    Two,
    /// Three nodes must have persisted.
    Three,
    /// Four nodes must have persisted.
    Four,
}

impl PersistTo {
    /// Minimum number of persisted copies this criterion demands.
    pub fn value(self) -> u32 {
        match self {
            PersistTo::None => 0,
            PersistTo::Master | PersistTo::One => 1,
            PersistTo::Two => 2,
            PersistTo::Three => 3,
            PersistTo::Four => 4,
        }
    }

    /// True if satisfying this criterion requires probing replicas.
    ///
    /// [`PersistTo::Master`] and [`PersistTo::One`] can be satisfied by
    /// the active copy alone.
    pub fn touches_replica(self) -> bool {
        self.value() >= 2
    }
}

/// How many replicas must hold the mutation in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicateTo {
    /// No replication requirement.
    None,
    /// One replica must hold the mutation.
    One,
    /// Two replicas must hold the mutation.
    Two,
    /// Three replicas must hold the mutation.
    Three,
}

impl ReplicateTo {
    /// Minimum number of replicas this criterion demands.
    pub fn value(self) -> u32 {
        match self {
            ReplicateTo::None => 0,
            ReplicateTo::One => 1,
            ReplicateTo::Two => 2,
            ReplicateTo::Three => 3,
        }
    }

    /// True if satisfying this criterion requires probing replicas.
    pub fn touches_replica(self) -> bool {
        self.value() >= 1
    }
}
