//! Node selection for config polling.

use reef_types::{BucketConfig, NodeInfo};

/// Ordered iterator over a bucket's KV-enabled nodes.
///
/// Yields nodes in [`BucketConfig::nodes`] order, skipping any node that
/// does not expose the binary key-value service. The sequence is finite
/// and not restartable; create a new selector to start over.
pub struct NodeSelector<'a> {
    nodes: std::slice::Iter<'a, NodeInfo>,
}

impl<'a> NodeSelector<'a> {
    /// Create a selector over the given bucket config snapshot.
    pub fn new(config: &'a BucketConfig) -> Self {
        Self {
            nodes: config.nodes.iter(),
        }
    }
}

impl<'a> Iterator for NodeSelector<'a> {
    type Item = &'a NodeInfo;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.by_ref().find(|node| node.has_kv_service())
    }
}
