//! Error taxonomy for the conversion pipeline.
//!
//! Every error aborts the whole conversion. Variants carry the intersection,
//! signal group and offending value needed to fix the input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Structurally invalid OCIT input
    #[error("malformed OCIT input: {0}")]
    MalformedInput(String),

    #[error("signal group '{group}' of intersection '{intersection}' has no connection index annotation (Bemerkung)")]
    MissingAnnotation { intersection: String, group: String },

    #[error("signal group '{group}' of intersection '{intersection}' has an invalid connection index '{token}' in its annotation: {reason}")]
    AnnotationFormat {
        intersection: String,
        group: String,
        token: String,
        reason: String,
    },

    #[error("connection index {index} of intersection '{intersection}' is claimed by both '{first_group}' and '{second_group}'")]
    AnnotationConflict {
        intersection: String,
        index: usize,
        first_group: String,
        second_group: String,
    },

    #[error("intersection '{intersection}' has no signal group for connection index {}", format_indices(.missing))]
    IncompleteCoverage {
        intersection: String,
        missing: Vec<usize>,
    },

    #[error("signal group '{group}' of intersection '{intersection}' has cycle length {found}s, expected {expected}s")]
    CycleLengthMismatch {
        intersection: String,
        group: String,
        expected: String,
        found: String,
    },

    #[error("signal group '{group}' of intersection '{intersection}' uses state '{symbol}' which has no SUMO equivalent")]
    UnknownStateSymbol {
        intersection: String,
        group: String,
        symbol: String,
    },

    #[error("internal consistency check failed for '{intersection}': {detail}")]
    InternalConsistency { intersection: String, detail: String },

    /// Unreadable or malformed connection index table
    #[error("index table: {0}")]
    IndexTable(String),

    /// Failure while serializing the output document
    #[error("failed to write output: {0}")]
    Output(String),
}

fn format_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
