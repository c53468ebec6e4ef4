use crate::graph::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TearingError>;

/// Faults of the ordering pipeline.
///
/// Two classes share this enum: input contract violations (caller error,
/// checked up front) and internal invariant violations (a defect in the
/// ordering itself or in a collaborator result, checked after the fact).
/// Structural singularity is a normal outcome and is reported through
/// `SpikedForm::singular`, never through this type.
#[derive(Error, Debug)]
pub enum TearingError {
    #[error("empty equation set")]
    EmptyEquationSet,

    #[error("not a square system: {equations} equations, {nodes} graph nodes")]
    NotSquare { equations: usize, nodes: usize },

    #[error("pop on empty priority queue")]
    EmptyQueue,

    #[error("node {node} matched twice")]
    DoubleMatch { node: NodeId },

    #[error("forbidden edge ({equation}, {variable}) appears in the matching")]
    ForbiddenMatch { equation: NodeId, variable: NodeId },

    #[error("precedence graph does not cover all incidence graph nodes")]
    MissingNodes,

    #[error("precedence graph contains a cycle")]
    CycleDetected,

    #[error("row {row} reaches past the staircase boundary at column {column}")]
    EnvelopeViolation { row: NodeId, column: NodeId },

    #[error("row {row} has an above-diagonal entry in non-tear column {column}")]
    SpikedFormViolation { row: NodeId, column: NodeId },

    #[error("matching size {matched} disagrees with expected {expected}")]
    MatchCountMismatch { matched: usize, expected: usize },

    #[error("node {node} has {count} assignments, at most one allowed")]
    MultipleAssignments { node: NodeId, count: usize },

    #[error("row order covers {got} equations, expected {expected}")]
    IncompleteRowOrder { got: usize, expected: usize },
}
