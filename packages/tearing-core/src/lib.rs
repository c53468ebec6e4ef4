/*
 * Tearing Core - Structural Ordering for Sparse Algebraic Systems
 *
 * Row/column reordering of sparse bipartite incidence graphs into
 * block-lower-Hessenberg and spiked forms with a small tear set, the
 * structural preprocessing step before solving large equation systems by
 * sequential substitution.
 *
 * Architecture:
 * - Incidence Graph (adjacency-map bipartite graph, two working views)
 * - Updatable Min-Priority Queue (lazy stale-key discard)
 * - Minimum-Degree Eliminator (greedy, fully deterministic)
 * - Hessenberg / Spiked Converters
 * - Precedence DAG Builder & Verifier (petgraph)
 */

// Public modules
pub mod dag;
pub mod error;
pub mod graph;
pub mod heap;
pub mod hessenberg;
pub mod matching;
pub mod min_degree;
pub mod perm;
pub mod spiked;

// Re-exports
pub use dag::{matching_to_dag, AssignmentDag};
pub use error::{Result, TearingError};
pub use graph::{EdgeSet, IncidenceGraph, NodeId};
pub use heap::{EqHeap, HeapKey};
pub use hessenberg::{hessenberg, to_hessenberg_form, HessenbergForm, TieBreaking};
pub use matching::{Matching, MatchingOracle, MaxCardinalityOracle};
pub use min_degree::{min_degree, Elimination};
pub use perm::{argsort, inverse_perm};
pub use spiked::{check_spiked_form, to_spiked_form, to_spiked_form_with_oracle, SpikedForm};

#[cfg(test)]
mod tests {
    #[test]
    fn it_works() {
        assert_eq!(2 + 2, 4);
    }
}
