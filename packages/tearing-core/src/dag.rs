//! Precedence DAG built from the matching.
//!
//! Every incidence edge becomes one directed edge: equation to variable if
//! the pair is matched, variable to equation otherwise. A valid ordering
//! yields an acyclic graph in which each equation computes at most one
//! variable and each variable is computed by at most one equation; the
//! builder verifies all of it and rejects the ordering otherwise.

use crate::error::{Result, TearingError};
use crate::graph::{EdgeSet, IncidenceGraph, NodeId};
use crate::min_degree::Elimination;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

/// Directed assignment graph over the original nodes.
#[derive(Debug)]
pub struct AssignmentDag {
    graph: DiGraph<NodeId, ()>,
    node_map: FxHashMap<NodeId, NodeIndex>,
}

impl AssignmentDag {
    pub fn graph(&self) -> &DiGraph<NodeId, ()> {
        &self.graph
    }

    pub fn node_index(&self, n: NodeId) -> Option<NodeIndex> {
        self.node_map.get(&n).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Build and verify the precedence DAG of an elimination result.
///
/// All failures are internal-consistency faults: a defect in the ordering
/// or a malformed collaborator result, never a user error.
pub fn matching_to_dag(
    g_orig: &IncidenceGraph,
    eqs: &BTreeSet<NodeId>,
    forbidden: &EdgeSet,
    elim: &Elimination,
) -> Result<AssignmentDag> {
    let matched_edges: FxHashSet<(NodeId, NodeId)> = elim
        .matches
        .iter()
        .filter(|(n, _)| eqs.contains(n))
        .map(|(&e, &v)| (e, v))
        .collect();
    let len_matches = matched_edges.len();

    for &(e, v) in &matched_edges {
        if forbidden.contains(&(e, v)) {
            return Err(TearingError::ForbiddenMatch {
                equation: e,
                variable: v,
            });
        }
    }

    let mut graph: DiGraph<NodeId, ()> = DiGraph::new();
    let mut node_map: FxHashMap<NodeId, NodeIndex> = FxHashMap::default();

    // Degree-zero equations still get a node; variables enter through
    // their incident edges only, so a dropped isolated variable fails the
    // coverage check below instead of being silently inserted.
    for &eq in &elim.rowp {
        node_map.insert(eq, graph.add_node(eq));
    }

    let mut unseen_matched = matched_edges.clone();
    for &eq in &elim.rowp {
        let ei = node_map[&eq];
        for v in g_orig.neighbors(eq) {
            let vi = *node_map
                .entry(v)
                .or_insert_with(|| graph.add_node(v));
            if matched_edges.contains(&(eq, v)) {
                graph.add_edge(ei, vi, ());
                unseen_matched.remove(&(eq, v));
            } else {
                graph.add_edge(vi, ei, ());
            }
        }
    }

    // Every matched pair must correspond to an actual incidence edge.
    if !unseen_matched.is_empty() {
        return Err(TearingError::MatchCountMismatch {
            matched: len_matches - unseen_matched.len(),
            expected: len_matches,
        });
    }

    if graph.node_count() != g_orig.node_count()
        || !g_orig.nodes().all(|n| node_map.contains_key(&n))
    {
        return Err(TearingError::MissingNodes);
    }

    if is_cyclic_directed(&graph) {
        return Err(TearingError::CycleDetected);
    }

    // Two independent counts of the matched pairs must agree with the
    // matching size.
    let expected_rows = eqs.len() - elim.sink_set.len();
    if len_matches != expected_rows {
        return Err(TearingError::MatchCountMismatch {
            matched: len_matches,
            expected: expected_rows,
        });
    }
    let expected_cols = g_orig.node_count() - eqs.len() - elim.tear_set.len();
    if len_matches != expected_cols {
        return Err(TearingError::MatchCountMismatch {
            matched: len_matches,
            expected: expected_cols,
        });
    }

    for &eq in &elim.rowp {
        let out = graph
            .edges_directed(node_map[&eq], Direction::Outgoing)
            .count();
        if out > 1 {
            return Err(TearingError::MultipleAssignments {
                node: eq,
                count: out,
            });
        }
    }
    for &var in &elim.colp {
        let inc = graph
            .edges_directed(node_map[&var], Direction::Incoming)
            .count();
        if inc > 1 {
            return Err(TearingError::MultipleAssignments {
                node: var,
                count: inc,
            });
        }
    }

    Ok(AssignmentDag { graph, node_map })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::min_degree::min_degree;

    fn dag_of(
        rows: &[usize],
        cols: &[usize],
        n: usize,
        forbidden: &EdgeSet,
    ) -> (IncidenceGraph, BTreeSet<NodeId>, Elimination) {
        let values = vec![1.0; rows.len()];
        let (g, eqs) = IncidenceGraph::from_coo(rows, cols, &values, n, n);
        let elim = min_degree(&g, &eqs, forbidden).unwrap();
        (g, eqs, elim)
    }

    #[test]
    fn test_identity_dag() {
        let forbidden = EdgeSet::default();
        let (g, eqs, elim) = dag_of(&[0, 1, 2], &[0, 1, 2], 3, &forbidden);
        let dag = matching_to_dag(&g, &eqs, &forbidden, &elim).unwrap();
        assert_eq!(dag.node_count(), 6);
        assert_eq!(dag.edge_count(), 3);
        // every edge points equation -> variable
        for eq in 0..3 {
            let ei = dag.node_index(eq).unwrap();
            assert_eq!(
                dag.graph()
                    .edges_directed(ei, Direction::Outgoing)
                    .count(),
                1
            );
        }
    }

    #[test]
    fn test_unmatched_edges_point_into_equations() {
        let forbidden = EdgeSet::default();
        // dense 2x2: eq 0 takes both variables, eq 1 becomes a sink and
        // variable 3 a tear
        let (g, eqs, elim) = dag_of(&[0, 0, 1, 1], &[0, 1, 0, 1], 2, &forbidden);
        let dag = matching_to_dag(&g, &eqs, &forbidden, &elim).unwrap();
        assert_eq!(elim.sink_set.len(), 1);
        assert_eq!(elim.tear_set.len(), 1);

        for &s in &elim.sink_set {
            let si = dag.node_index(s).unwrap();
            assert_eq!(
                dag.graph().edges_directed(si, Direction::Outgoing).count(),
                0
            );
        }
        for &t in &elim.tear_set {
            let ti = dag.node_index(t).unwrap();
            assert_eq!(
                dag.graph().edges_directed(ti, Direction::Incoming).count(),
                0
            );
        }
    }

    #[test]
    fn test_forbidden_match_is_a_fault() {
        let forbidden = EdgeSet::default();
        let (g, eqs, elim) = dag_of(&[0, 1, 2], &[0, 1, 2], 3, &forbidden);
        // pretend edge (0, 3) had been forbidden all along
        let mut bad = EdgeSet::default();
        bad.insert((0, 3));
        let err = matching_to_dag(&g, &eqs, &bad, &elim).unwrap_err();
        assert!(matches!(err, TearingError::ForbiddenMatch { .. }));
    }

    #[test]
    fn test_isolated_variable_fails_coverage() {
        let forbidden = EdgeSet::default();
        // variable 3 has no incident edge at all
        let values = [1.0];
        let (g, eqs) = IncidenceGraph::from_coo(&[0], &[0], &values, 2, 2);
        let elim = min_degree(&g, &eqs, &forbidden).unwrap();
        let err = matching_to_dag(&g, &eqs, &forbidden, &elim).unwrap_err();
        assert!(matches!(err, TearingError::MissingNodes));
    }

    #[test]
    fn test_tampered_sink_set_is_a_fault() {
        let forbidden = EdgeSet::default();
        let (g, eqs, mut elim) = dag_of(&[0, 1, 2], &[0, 1, 2], 3, &forbidden);
        elim.sink_set.insert(1);
        let err = matching_to_dag(&g, &eqs, &forbidden, &elim).unwrap_err();
        assert!(matches!(err, TearingError::MatchCountMismatch { .. }));
    }
}
