//! Greedy minimum-degree elimination of a bipartite equation system.
//!
//! Repeatedly removes the lowest-priority equation, tentatively matches it
//! to an allowed variable, removes the equation and every variable it
//! touches from both working views, and refreshes the priority of the
//! surviving equations whose adjacency changed. The heuristic has no
//! lookahead; the priority key alone steers the order.

use crate::error::{Result, TearingError};
use crate::graph::{EdgeSet, IncidenceGraph, NodeId};
use crate::heap::{EqHeap, HeapKey};
use crate::hessenberg::hessenberg_order_of;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Outcome of one elimination run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elimination {
    /// Equations in elimination order.
    pub rowp: Vec<NodeId>,
    /// Variables in the derived Hessenberg column order.
    pub colp: Vec<NodeId>,
    /// Equation-variable matching; both directions of every pair are
    /// present.
    pub matches: FxHashMap<NodeId, NodeId>,
    /// Unmatched variables: the spikes whose values must be guessed.
    pub tear_set: FxHashSet<NodeId>,
    /// Unmatched equations: the residuals solved simultaneously with the
    /// tears.
    pub sink_set: FxHashSet<NodeId>,
}

/// Order the equations of `g_orig` by minimum-degree elimination.
///
/// `forbidden` pairs are excluded from matching but still count towards
/// degrees. The caller keeps `g_orig`; the elimination works on its own
/// pair of shrinking copies (a full view and an allowed view, removed from
/// in lockstep).
pub fn min_degree(
    g_orig: &IncidenceGraph,
    eqs: &BTreeSet<NodeId>,
    forbidden: &EdgeSet,
) -> Result<Elimination> {
    if eqs.is_empty() {
        return Err(TearingError::EmptyEquationSet);
    }

    let (mut g_allowed, mut g) = setup_graphs(g_orig, forbidden);
    let mut heap = create_heap(&g_allowed, &g, eqs);

    let mut rowp: Vec<NodeId> = Vec::with_capacity(eqs.len());
    let mut matches: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    while !heap.is_empty() {
        let (eq, _) = heap.pop_min()?;
        rowp.push(eq);

        if let Some(var) = g_allowed.smallest_neighbor(eq) {
            if matches.contains_key(&eq) {
                return Err(TearingError::DoubleMatch { node: eq });
            }
            if matches.contains_key(&var) {
                return Err(TearingError::DoubleMatch { node: var });
            }
            matches.insert(eq, var);
            matches.insert(var, eq);
        }

        // Eliminating an equation removes every variable it touches in the
        // full view, matched or not.
        let vrs: Vec<NodeId> = g.neighbors(eq).collect();

        let mut eqs_update: BTreeSet<NodeId> = BTreeSet::new();
        for &v in &vrs {
            eqs_update.extend(g.neighbors(v));
        }
        eqs_update.remove(&eq);

        g_allowed.remove_node(eq);
        g.remove_node(eq);
        g_allowed.remove_nodes_from(vrs.iter().copied());
        g.remove_nodes_from(vrs.iter().copied());

        // Every surviving equation whose adjacency shrank gets a fresh
        // key. Pops act on the freshest key per id, so no equation may be
        // left out here.
        for &e in &eqs_update {
            heap.insert_or_update(e, priority_key(&g_allowed, &g, e));
        }

        debug!(
            "eliminated equation {} with {} variables, {} keys refreshed",
            eq,
            vrs.len(),
            eqs_update.len()
        );
    }

    if rowp.len() != eqs.len() {
        return Err(TearingError::IncompleteRowOrder {
            got: rowp.len(),
            expected: eqs.len(),
        });
    }

    // The row order determines the column order; the derivation also
    // certifies the staircase envelope.
    let colp = hessenberg_order_of(g_orig, eqs, &rowp, &matches)?;

    let sink_set: FxHashSet<NodeId> = rowp
        .iter()
        .copied()
        .filter(|n| !matches.contains_key(n))
        .collect();
    let tear_set: FxHashSet<NodeId> = colp
        .iter()
        .copied()
        .filter(|n| !matches.contains_key(n))
        .collect();

    debug!(
        "elimination finished: {} tears, {} residuals",
        tear_set.len(),
        sink_set.len()
    );

    Ok(Elimination {
        rowp,
        colp,
        matches,
        tear_set,
        sink_set,
    })
}

/// Build the working pair: a full copy and an allowed copy with the
/// forbidden edges filtered out. Both are owned by the run and shrink in
/// lockstep.
fn setup_graphs(g_orig: &IncidenceGraph, forbidden: &EdgeSet) -> (IncidenceGraph, IncidenceGraph) {
    let g = g_orig.clone();
    let g_allowed = g_orig.without_edges(forbidden);
    (g_allowed, g)
}

/// Key of an equation from its current adjacency: an equation with no
/// allowed match candidate loses the one-off discount.
fn priority_key(g_allowed: &IncidenceGraph, g: &IncidenceGraph, eq: NodeId) -> HeapKey {
    let tot = g.degree(eq);
    let cost = if g_allowed.degree(eq) > 0 { tot - 1 } else { tot };
    (cost, tot, eq)
}

fn create_heap(g_allowed: &IncidenceGraph, g: &IncidenceGraph, eqs: &BTreeSet<NodeId>) -> EqHeap {
    let mut heap = EqHeap::new();
    for &e in eqs {
        heap.insert_or_update(e, priority_key(g_allowed, g, e));
    }
    heap
}
