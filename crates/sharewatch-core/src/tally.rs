//! Per-node success/failure accounting and suspect selection.

use serde::Serialize;

use crate::report::CombinationResult;

/// How often a node took part in valid and in invalid combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTally {
    /// Zero-based node index.
    pub node: usize,
    /// Valid combinations containing this node.
    pub successes: u64,
    /// Invalid or failed combinations containing this node.
    pub failures: u64,
}

impl NodeTally {
    /// Empty tally for `node`.
    #[must_use]
    pub const fn new(node: usize) -> Self {
        Self {
            node,
            successes: 0,
            failures: 0,
        }
    }

    /// Total combinations this node appeared in.
    #[must_use]
    pub const fn participations(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }

    /// A node is suspect when it failed at least once and never succeeded.
    ///
    /// Any success clears the node: the failures it shares with others are
    /// attributed to a different share in those subsets.
    #[must_use]
    pub const fn is_suspect(&self) -> bool {
        self.failures > 0 && self.successes == 0
    }
}

/// Count successes and failures per node over all combination results.
///
/// Indices outside `0..nodes` are ignored.
#[must_use]
pub fn tally_nodes(nodes: usize, results: &[CombinationResult]) -> Vec<NodeTally> {
    let mut tallies: Vec<NodeTally> = (0..nodes).map(NodeTally::new).collect();
    for result in results {
        for &node in &result.nodes {
            let Some(tally) = tallies.get_mut(node) else {
                continue;
            };
            if result.valid {
                tally.successes = tally.successes.saturating_add(1);
            } else {
                tally.failures = tally.failures.saturating_add(1);
            }
        }
    }
    tallies
}

/// Nodes flagged by [`NodeTally::is_suspect`], ascending.
#[must_use]
pub fn suspects(tallies: &[NodeTally]) -> Vec<usize> {
    tallies
        .iter()
        .filter(|t| t.is_suspect())
        .map(|t| t.node)
        .collect()
}
