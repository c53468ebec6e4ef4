//! Maximum-matching oracle for the spiked-form singularity probe.

use crate::graph::{IncidenceGraph, NodeId};
use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::FxHashMap;

/// Symmetric matching: both directions of every matched pair are present,
/// so the entry count is twice the pair count.
pub type Matching = FxHashMap<NodeId, NodeId>;

/// Structural matching oracle.
///
/// The singularity probe consumes only the matching size, so any maximum
/// matching qualifies regardless of edge weights; implementations with a
/// weight objective plug in through this trait.
pub trait MatchingOracle {
    fn max_matching(&self, g: &IncidenceGraph) -> Matching;
}

/// Default oracle backed by petgraph's maximum matching.
#[derive(Debug, Default)]
pub struct MaxCardinalityOracle;

impl MatchingOracle for MaxCardinalityOracle {
    fn max_matching(&self, g: &IncidenceGraph) -> Matching {
        // mirror the incidence graph into petgraph, node ids as weights
        let mut pg: UnGraph<NodeId, f64> = UnGraph::new_undirected();
        let mut idx: FxHashMap<NodeId, NodeIndex> = FxHashMap::default();
        for n in g.nodes() {
            idx.insert(n, pg.add_node(n));
        }
        for (u, v) in g.edges() {
            pg.add_edge(idx[&u], idx[&v], g.edge_weight(u, v).unwrap_or(1.0));
        }

        let matching = petgraph::algo::maximum_matching(&pg);
        let mut out = Matching::default();
        for (a, b) in matching.edges() {
            let (u, v) = (pg[a], pg[b]);
            out.insert(u, v);
            out.insert(v, u);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_matching_on_identity() {
        let (g, _) = IncidenceGraph::from_coo(&[0, 1, 2], &[0, 1, 2], &[1.0; 3], 3, 3);
        let m = MaxCardinalityOracle.max_matching(&g);
        assert_eq!(m.len(), 6);
        for eq in 0..3 {
            assert_eq!(m[&eq], eq + 3);
            assert_eq!(m[&(eq + 3)], eq);
        }
    }

    #[test]
    fn test_deficient_matching() {
        // both equations compete for the single variable 2
        let (g, _) = IncidenceGraph::from_coo(&[0, 1], &[0, 0], &[1.0, 1.0], 2, 2);
        let m = MaxCardinalityOracle.max_matching(&g);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_matching_is_symmetric() {
        let (g, _) =
            IncidenceGraph::from_coo(&[0, 0, 1, 1], &[0, 1, 0, 1], &[1.0; 4], 2, 2);
        let m = MaxCardinalityOracle.max_matching(&g);
        for (&u, &v) in &m {
            assert_eq!(m[&v], u);
        }
    }
}
