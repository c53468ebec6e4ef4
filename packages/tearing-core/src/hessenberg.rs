//! Hessenberg-form conversion.
//!
//! Thin orchestration over the eliminator: derive the column order implied
//! by the row order, certify the staircase envelope, and partition the
//! orders into matched and unmatched parts. Also hosts the coordinate
//! entry point with optional weight-based row tie breaking.

use crate::error::{Result, TearingError};
use crate::graph::{EdgeSet, IncidenceGraph, NodeId};
use crate::min_degree::min_degree;
use crate::perm::{argsort, inverse_perm};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Row tie-breaking options for [`hessenberg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreaking {
    /// Relabel rows so lighter rows get smaller ids.
    MinFirst,
    /// Relabel rows so heavier rows get smaller ids.
    MaxFirst,
    /// Keep the input labeling.
    Ignore,
}

/// Hessenberg-form ordering of a bipartite system. All lists follow the
/// sequencing of the permutation they were filtered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HessenbergForm {
    pub rowp: Vec<NodeId>,
    pub colp: Vec<NodeId>,
    /// Tear (guessed) variables, in `colp` order.
    pub tears: Vec<NodeId>,
    /// Residual equations, in `rowp` order.
    pub sinks: Vec<NodeId>,
    /// Matched equations, in `rowp` order.
    pub row_matches: Vec<NodeId>,
    /// Matched variables, in `colp` order.
    pub col_matches: Vec<NodeId>,
}

/// Order `g` into Hessenberg form. Pure orchestration over the eliminator;
/// the partitions are stable filters of the permutations, not re-sorts.
pub fn to_hessenberg_form(
    g: &IncidenceGraph,
    eqs: &BTreeSet<NodeId>,
    forbidden: &EdgeSet,
) -> Result<HessenbergForm> {
    let elim = min_degree(g, eqs, forbidden)?;

    let tears = elim
        .colp
        .iter()
        .copied()
        .filter(|c| elim.tear_set.contains(c))
        .collect::<Vec<_>>();
    let sinks = elim
        .rowp
        .iter()
        .copied()
        .filter(|r| elim.sink_set.contains(r))
        .collect::<Vec<_>>();
    let row_matches = elim
        .rowp
        .iter()
        .copied()
        .filter(|r| elim.matches.contains_key(r))
        .collect::<Vec<_>>();
    let col_matches = elim
        .colp
        .iter()
        .copied()
        .filter(|c| elim.matches.contains_key(c))
        .collect::<Vec<_>>();

    info!(
        "hessenberg form: {} equations, {} tears, {} residuals",
        elim.rowp.len(),
        tears.len(),
        sinks.len()
    );

    Ok(HessenbergForm {
        rowp: elim.rowp,
        colp: elim.colp,
        tears,
        sinks,
        row_matches,
        col_matches,
    })
}

/// Derive the Hessenberg column order implied by a row order and matching.
///
/// Variables enter the order at the first row that touches them; within one
/// row's block the matched variable sits last, on the staircase boundary.
/// Variables no equation touches are appended at the end. The staircase
/// envelope is certified before returning.
pub fn hessenberg_order_of(
    g_orig: &IncidenceGraph,
    eqs: &BTreeSet<NodeId>,
    rowp: &[NodeId],
    matches: &FxHashMap<NodeId, NodeId>,
) -> Result<Vec<NodeId>> {
    let n_vars = g_orig.node_count() - eqs.len();
    let mut colp: Vec<NodeId> = Vec::with_capacity(n_vars);
    let mut placed: FxHashSet<NodeId> = FxHashSet::default();

    for &eq in rowp {
        // neighbors come ascending already
        let mut fresh: Vec<NodeId> = g_orig
            .neighbors(eq)
            .filter(|v| !placed.contains(v))
            .collect();
        if let Some(&var) = matches.get(&eq) {
            if let Some(pos) = fresh.iter().position(|&v| v == var) {
                fresh.remove(pos);
                fresh.push(var);
            }
        }
        for v in fresh {
            placed.insert(v);
            colp.push(v);
        }
    }
    for n in g_orig.nodes() {
        if !eqs.contains(&n) && !placed.contains(&n) {
            colp.push(n);
        }
    }

    check_envelope(g_orig, rowp, &colp)?;
    Ok(colp)
}

/// Certify the staircase envelope: every entry of row `i` must sit in a
/// column placed by the end of row `i`. The boundary is recomputed from
/// the incidence structure, independently of how `colp` was built, so a
/// bookkeeping bug actually fails here.
fn check_envelope(g_orig: &IncidenceGraph, rowp: &[NodeId], colp: &[NodeId]) -> Result<()> {
    let pos: FxHashMap<NodeId, usize> = colp.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let mut touched: FxHashSet<NodeId> = FxHashSet::default();
    let mut boundary = 0usize;

    for &eq in rowp {
        for v in g_orig.neighbors(eq) {
            if touched.insert(v) {
                boundary += 1;
            }
        }
        for v in g_orig.neighbors(eq) {
            match pos.get(&v) {
                Some(&p) if p < boundary => {}
                _ => return Err(TearingError::EnvelopeViolation { row: eq, column: v }),
            }
        }
    }
    Ok(())
}

/// Hessenberg ordering of an `n_rows x n_cols` sparse coordinate matrix,
/// optionally breaking row ties by weight. Returns inverse permutations:
/// the position of each original row and column in the computed order.
pub fn hessenberg(
    rows: &[usize],
    cols: &[usize],
    values: &[f64],
    n_rows: usize,
    n_cols: usize,
    tie_breaking: TieBreaking,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let (g, eqs) = IncidenceGraph::from_coo(rows, cols, values, n_rows, n_cols);

    // Relabel the rows so they are ordered by weight; undone below.
    let (g, eqs, row_pos) = if tie_breaking == TieBreaking::Ignore {
        (g, eqs, None)
    } else {
        let weights = g.row_weights(n_rows);
        let reverse = tie_breaking == TieBreaking::MaxFirst;
        let row_pos = argsort(&weights, reverse);
        let mapping: FxHashMap<NodeId, NodeId> =
            row_pos.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let eqs: BTreeSet<NodeId> = eqs.iter().map(|eq| mapping[eq]).collect();
        (g.relabel(&mapping), eqs, Some(row_pos))
    };

    let form = to_hessenberg_form(&g, &eqs, &EdgeSet::default())?;

    let mut rperm = form.rowp;
    // Shift the columns back into 0..n_cols.
    let cperm: Vec<usize> = form.colp.iter().map(|c| c - n_rows).collect();
    if let Some(row_pos) = row_pos {
        for r in rperm.iter_mut() {
            *r = row_pos[*r];
        }
    }

    Ok(inverse_perm(&rperm, &cperm))
}
