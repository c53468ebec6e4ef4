//! Spiked-form conversion.
//!
//! Two phases: a cheap matching-based singularity probe over the whole
//! graph, then the elimination with the tear columns relocated onto the
//! sink-row positions. Structural singularity is a normal outcome carried
//! by the `singular` flag, not an error.

use crate::error::{Result, TearingError};
use crate::graph::{EdgeSet, IncidenceGraph, NodeId};
use crate::matching::{MatchingOracle, MaxCardinalityOracle};
use crate::min_degree::min_degree;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Spiked-form ordering of a square system. Singular systems carry empty
/// orders and sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikedForm {
    pub singular: bool,
    pub rowp: Vec<NodeId>,
    pub colp: Vec<NodeId>,
    /// Spike variables, in `colp` order.
    pub tears: Vec<NodeId>,
    /// Residual equations, in `rowp` order.
    pub sinks: Vec<NodeId>,
}

impl SpikedForm {
    fn singular() -> Self {
        SpikedForm {
            singular: true,
            rowp: Vec::new(),
            colp: Vec::new(),
            tears: Vec::new(),
            sinks: Vec::new(),
        }
    }
}

/// Order a square system into spiked form with the default matching
/// oracle.
pub fn to_spiked_form(
    g: &IncidenceGraph,
    eqs: &BTreeSet<NodeId>,
    forbidden: &EdgeSet,
) -> Result<SpikedForm> {
    to_spiked_form_with_oracle(g, eqs, forbidden, &MaxCardinalityOracle)
}

pub fn to_spiked_form_with_oracle(
    g: &IncidenceGraph,
    eqs: &BTreeSet<NodeId>,
    forbidden: &EdgeSet,
    oracle: &dyn MatchingOracle,
) -> Result<SpikedForm> {
    if 2 * eqs.len() != g.node_count() {
        return Err(TearingError::NotSquare {
            equations: eqs.len(),
            nodes: g.node_count(),
        });
    }

    // Probe the whole graph, forbidden edges included: a square system
    // whose maximum matching leaves an equation unsaturated is
    // structurally singular and the expensive elimination is skipped.
    let probe = oracle.max_matching(g);
    if probe.len() != 2 * eqs.len() {
        info!(
            "structurally singular system: matched {} of {} equations",
            probe.len() / 2,
            eqs.len()
        );
        return Ok(SpikedForm::singular());
    }

    let elim = min_degree(g, eqs, forbidden)?;
    let colp = spiked_order_of(&elim.rowp, &elim.colp, &elim.matches, &elim.tear_set)?;
    check_spiked_form(g, &elim.rowp, &colp, &elim.tear_set)?;

    let tears: Vec<NodeId> = colp
        .iter()
        .copied()
        .filter(|c| elim.tear_set.contains(c))
        .collect();
    let sinks: Vec<NodeId> = elim
        .rowp
        .iter()
        .copied()
        .filter(|r| elim.sink_set.contains(r))
        .collect();

    info!("spiked form: {} tears", tears.len());

    Ok(SpikedForm {
        singular: false,
        rowp: elim.rowp,
        colp,
        tears,
        sinks,
    })
}

/// Relocate the tears: matched rows keep their matched variable on the
/// diagonal, sink-row positions take the tear variables in Hessenberg
/// column order. Square systems pair each sink with exactly one tear; the
/// counts are verified rather than assumed.
pub fn spiked_order_of(
    rowp: &[NodeId],
    colp_hess: &[NodeId],
    matches: &FxHashMap<NodeId, NodeId>,
    tear_set: &FxHashSet<NodeId>,
) -> Result<Vec<NodeId>> {
    let tears: Vec<NodeId> = colp_hess
        .iter()
        .copied()
        .filter(|c| tear_set.contains(c))
        .collect();
    let sinks = rowp.iter().filter(|r| !matches.contains_key(r)).count();
    if tears.len() != sinks {
        return Err(TearingError::MatchCountMismatch {
            matched: tears.len(),
            expected: sinks,
        });
    }

    let mut next_tear = 0usize;
    let mut colp = Vec::with_capacity(rowp.len());
    for r in rowp {
        match matches.get(r) {
            Some(&var) => colp.push(var),
            None => {
                colp.push(tears[next_tear]);
                next_tear += 1;
            }
        }
    }
    Ok(colp)
}

/// Verify the spiked shape: entries above the diagonal may only sit in
/// tear columns.
pub fn check_spiked_form(
    g: &IncidenceGraph,
    rowp: &[NodeId],
    colp: &[NodeId],
    tear_set: &FxHashSet<NodeId>,
) -> Result<()> {
    let pos: FxHashMap<NodeId, usize> = colp.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    for (i, &eq) in rowp.iter().enumerate() {
        for v in g.neighbors(eq) {
            if tear_set.contains(&v) {
                continue;
            }
            match pos.get(&v) {
                Some(&p) if p <= i => {}
                _ => return Err(TearingError::SpikedFormViolation { row: eq, column: v }),
            }
        }
    }
    Ok(())
}
