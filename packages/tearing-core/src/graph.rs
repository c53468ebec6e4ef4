//! Bipartite incidence graph of a sparse equation system.
//!
//! Nodes are plain integer ids: equations occupy `0..n_rows`, variables are
//! offset past them (`n_rows..n_rows + n_cols`), mirroring a sparse
//! coordinate matrix whose column ids were shifted by the row count.
//! Adjacency is a map of ordered sets, so neighbor and node enumeration is
//! always in ascending id order; the deterministic tie-breaks of the
//! elimination depend on that.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};

pub type NodeId = usize;

/// Set of (equation, variable) pairs, e.g. the forbidden edges of a run.
pub type EdgeSet = FxHashSet<(NodeId, NodeId)>;

/// Normalized undirected edge key, insensitive to endpoint order.
fn edge_key(u: NodeId, v: NodeId) -> (NodeId, NodeId) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// Undirected bipartite incidence graph with weighted edges.
///
/// Weights are carried for the matching oracle and row-weight tie breaking
/// only; the ordering itself is purely structural.
#[derive(Debug, Clone, Default)]
pub struct IncidenceGraph {
    adj: BTreeMap<NodeId, BTreeSet<NodeId>>,
    weights: FxHashMap<(NodeId, NodeId), f64>,
}

impl IncidenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the bipartite graph of an `n_rows x n_cols` sparse matrix in
    /// coordinate format. Column ids are shifted by `n_rows`. Returns the
    /// graph and the equation id set. Duplicate coordinates collapse into
    /// one edge keeping the last weight.
    pub fn from_coo(
        rows: &[usize],
        cols: &[usize],
        values: &[f64],
        n_rows: usize,
        n_cols: usize,
    ) -> (Self, BTreeSet<NodeId>) {
        debug_assert_eq!(rows.len(), cols.len());
        debug_assert_eq!(rows.len(), values.len());
        let mut g = Self::new();
        for r in 0..n_rows {
            g.add_node(r);
        }
        for c in 0..n_cols {
            g.add_node(n_rows + c);
        }
        for ((&r, &c), &w) in rows.iter().zip(cols).zip(values) {
            debug_assert!(r < n_rows && c < n_cols);
            g.add_edge(r, n_rows + c, w);
        }
        let eqs = (0..n_rows).collect();
        (g, eqs)
    }

    pub fn add_node(&mut self, n: NodeId) {
        self.adj.entry(n).or_default();
    }

    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: f64) {
        self.adj.entry(u).or_default().insert(v);
        self.adj.entry(v).or_default().insert(u);
        self.weights.insert(edge_key(u, v), weight);
    }

    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) {
        if let Some(nbrs) = self.adj.get_mut(&u) {
            nbrs.remove(&v);
        }
        if let Some(nbrs) = self.adj.get_mut(&v) {
            nbrs.remove(&u);
        }
        self.weights.remove(&edge_key(u, v));
    }

    pub fn contains(&self, n: NodeId) -> bool {
        self.adj.contains_key(&n)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adj.keys().copied()
    }

    /// Neighbors of `n` in ascending id order; empty for unknown nodes.
    pub fn neighbors(&self, n: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adj.get(&n).into_iter().flat_map(|s| s.iter().copied())
    }

    /// Smallest-id neighbor, the matched-variable tie-break of the
    /// eliminator.
    pub fn smallest_neighbor(&self, n: NodeId) -> Option<NodeId> {
        self.adj.get(&n).and_then(|s| s.iter().next().copied())
    }

    pub fn degree(&self, n: NodeId) -> usize {
        self.adj.get(&n).map_or(0, |s| s.len())
    }

    pub fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<f64> {
        self.weights.get(&edge_key(u, v)).copied()
    }

    /// Undirected edges, each reported once with the smaller endpoint
    /// first, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adj.iter().flat_map(|(&u, nbrs)| {
            nbrs.iter()
                .copied()
                .filter(move |&v| u < v)
                .map(move |v| (u, v))
        })
    }

    /// Remove a node together with all its incident edges.
    pub fn remove_node(&mut self, n: NodeId) {
        if let Some(nbrs) = self.adj.remove(&n) {
            for v in nbrs {
                if let Some(back) = self.adj.get_mut(&v) {
                    back.remove(&n);
                }
                self.weights.remove(&edge_key(n, v));
            }
        }
    }

    pub fn remove_nodes_from<I: IntoIterator<Item = NodeId>>(&mut self, nodes: I) {
        for n in nodes {
            self.remove_node(n);
        }
    }

    /// Copy of this graph with the given (equation, variable) pairs
    /// removed. This is how the allowed working view is derived from the
    /// full one.
    pub fn without_edges(&self, forbidden: &EdgeSet) -> Self {
        let mut g = self.clone();
        for &(u, v) in forbidden {
            g.remove_edge(u, v);
        }
        g
    }

    /// Copy with the nodes present in `mapping` relabeled; unmapped ids
    /// keep their label. Used by the row tie-breaking wrapper, which
    /// relabels equations only.
    pub fn relabel(&self, mapping: &FxHashMap<NodeId, NodeId>) -> Self {
        let tr = |n: NodeId| mapping.get(&n).copied().unwrap_or(n);
        let mut g = Self::new();
        for n in self.nodes() {
            g.add_node(tr(n));
        }
        for (u, v) in self.edges() {
            let w = self.edge_weight(u, v).unwrap_or(1.0);
            g.add_edge(tr(u), tr(v), w);
        }
        g
    }

    /// Per-row sum of absolute incident edge weights, the key for
    /// weight-based row tie breaking.
    pub fn row_weights(&self, n_equations: usize) -> Vec<f64> {
        (0..n_equations)
            .map(|r| {
                self.neighbors(r)
                    .map(|v| self.edge_weight(r, v).unwrap_or(0.0).abs())
                    .sum()
            })
            .collect()
    }
}
