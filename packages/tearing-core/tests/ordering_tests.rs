//! End-to-end scenarios for the ordering pipeline.

use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use tearing_core::{
    hessenberg, matching_to_dag, min_degree, to_hessenberg_form, to_spiked_form, EdgeSet,
    IncidenceGraph, NodeId, TearingError, TieBreaking,
};

fn coo(
    rows: &[usize],
    cols: &[usize],
    n_rows: usize,
    n_cols: usize,
) -> (IncidenceGraph, BTreeSet<NodeId>) {
    let values = vec![1.0; rows.len()];
    IncidenceGraph::from_coo(rows, cols, &values, n_rows, n_cols)
}

#[test]
fn test_identity_pattern_round_trip() {
    let (g, eqs) = coo(&[0, 1, 2], &[0, 1, 2], 3, 3);

    let form = to_spiked_form(&g, &eqs, &EdgeSet::default()).unwrap();
    assert!(!form.singular);
    assert_eq!(form.rowp, vec![0, 1, 2]);
    assert_eq!(form.colp, vec![3, 4, 5]);
    assert_eq!(form.tears, Vec::<NodeId>::new());
    assert_eq!(form.sinks, Vec::<NodeId>::new());

    let (rowp, colp) = hessenberg(
        &[0, 1, 2],
        &[0, 1, 2],
        &[1.0, 1.0, 1.0],
        3,
        3,
        TieBreaking::Ignore,
    )
    .unwrap();
    assert_eq!(rowp, vec![0, 1, 2]);
    assert_eq!(colp, vec![0, 1, 2]);
}

#[test]
fn test_structurally_singular_block() {
    // both equations share the single variable 2 and nothing else
    let (g, eqs) = coo(&[0, 1], &[0, 0], 2, 2);
    let form = to_spiked_form(&g, &eqs, &EdgeSet::default()).unwrap();
    assert!(form.singular);
    assert_eq!(form.rowp, Vec::<NodeId>::new());
    assert_eq!(form.colp, Vec::<NodeId>::new());
    assert_eq!(form.tears, Vec::<NodeId>::new());
    assert_eq!(form.sinks, Vec::<NodeId>::new());
}

#[test]
fn test_fully_forbidden_equation() {
    // eq 0 touches vars 3 and 4 but may match neither; eq 1 and eq 2 pick
    // up vars 3 and 5
    let (g, eqs) = coo(&[0, 0, 1, 2], &[0, 1, 0, 2], 3, 3);
    let mut forbidden = EdgeSet::default();
    forbidden.insert((0, 3));
    forbidden.insert((0, 4));

    let elim = min_degree(&g, &eqs, &forbidden).unwrap();
    assert!(elim.sink_set.contains(&0));
    assert!(!elim.matches.contains_key(&0));
    // var 3 is matched elsewhere, var 4 has no equation left and tears
    assert_eq!(elim.matches[&3], 1);
    assert!(elim.tear_set.contains(&4));
}

#[test]
fn test_matching_is_symmetric_and_partitions_cover() {
    let (g, eqs) = coo(
        &[0, 0, 1, 1, 2, 3, 3],
        &[0, 1, 1, 2, 2, 0, 3],
        4,
        4,
    );
    let form = to_hessenberg_form(&g, &eqs, &EdgeSet::default()).unwrap();

    let mut rowp_sorted = form.rowp.clone();
    rowp_sorted.sort_unstable();
    assert_eq!(rowp_sorted, vec![0, 1, 2, 3]);

    let mut colp_sorted = form.colp.clone();
    colp_sorted.sort_unstable();
    assert_eq!(colp_sorted, vec![4, 5, 6, 7]);

    // stable-filter partitions cover the permutations exactly
    assert_eq!(form.tears.len() + form.col_matches.len(), 4);
    assert_eq!(form.sinks.len() + form.row_matches.len(), 4);

    let elim = min_degree(&g, &eqs, &EdgeSet::default()).unwrap();
    for (&u, &v) in &elim.matches {
        assert_eq!(elim.matches[&v], u);
    }
}

#[test]
fn test_dag_invariants_on_chained_system() {
    // bidiagonal chain: eq i touches vars i and i+1
    let rows = [0, 0, 1, 1, 2, 2, 3];
    let cols = [0, 1, 1, 2, 2, 3, 3];
    let (g, eqs) = coo(&rows, &cols, 4, 4);
    let forbidden = EdgeSet::default();

    let elim = min_degree(&g, &eqs, &forbidden).unwrap();
    let dag = matching_to_dag(&g, &eqs, &forbidden, &elim).unwrap();
    assert_eq!(dag.node_count(), 8);
    assert_eq!(dag.edge_count(), rows.len());
}

#[test]
fn test_empty_equation_set_fault() {
    let g = IncidenceGraph::new();
    let err = min_degree(&g, &BTreeSet::new(), &EdgeSet::default()).unwrap_err();
    assert!(matches!(err, TearingError::EmptyEquationSet));
}

#[test]
fn test_non_square_fault() {
    let (g, eqs) = coo(&[0, 0], &[0, 1], 1, 2);
    let err = to_spiked_form(&g, &eqs, &EdgeSet::default()).unwrap_err();
    assert!(matches!(
        err,
        TearingError::NotSquare {
            equations: 1,
            nodes: 3
        }
    ));
}

#[test]
fn test_tie_breaking_reorders_by_weight() {
    // diagonal 2x2, row 0 much heavier than row 1
    let rows = [0, 1];
    let cols = [0, 1];
    let values = [5.0, 1.0];

    let (rowp, colp) = hessenberg(&rows, &cols, &values, 2, 2, TieBreaking::MinFirst).unwrap();
    // the light row is relabeled first and eliminated first
    assert_eq!(rowp, vec![1, 0]);
    assert_eq!(colp, vec![1, 0]);

    let (rowp, colp) = hessenberg(&rows, &cols, &values, 2, 2, TieBreaking::MaxFirst).unwrap();
    assert_eq!(rowp, vec![0, 1]);
    assert_eq!(colp, vec![0, 1]);

    let (rowp, colp) = hessenberg(&rows, &cols, &values, 2, 2, TieBreaking::Ignore).unwrap();
    assert_eq!(rowp, vec![0, 1]);
    assert_eq!(colp, vec![0, 1]);
}

#[test]
fn test_determinism_across_runs() {
    let rows = [0, 0, 1, 1, 2, 2, 3, 3];
    let cols = [0, 3, 0, 1, 1, 2, 2, 3];
    let (g1, eqs1) = coo(&rows, &cols, 4, 4);
    let (g2, eqs2) = coo(&rows, &cols, 4, 4);

    let a = min_degree(&g1, &eqs1, &EdgeSet::default()).unwrap();
    let b = min_degree(&g2, &eqs2, &EdgeSet::default()).unwrap();
    assert_eq!(a.rowp, b.rowp);
    assert_eq!(a.colp, b.colp);
    assert_eq!(a.matches.len(), b.matches.len());
    for (k, v) in &a.matches {
        assert_eq!(b.matches[k], *v);
    }
}
