//! FILENAME: cube-engine/src/error.rs

use thiserror::Error;

/// Failures of `Cube::add_rows`. The caller can fix the batch and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("invalid header: expected {expected} columns, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("column not found in header: {0}")]
    UnknownColumn(String),

    #[error("row {row} has {actual} values, header has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// A query named a dimension the cube does not have.
///
/// This is a caller bug rather than a data problem: the operator stops
/// before producing any output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("dimension not found: {0}")]
    UnknownDimension(String),
}

/// The first structural violation found by `Cube::is_valid`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidityError {
    #[error("invalid point {index}: {actual} values for {expected} dimensions")]
    InvalidPoint {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid data row {index}: {actual} values for {expected} fields")]
    InvalidDataRow {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("orphan rows: {points} points for {data} data rows")]
    OrphanRows { points: usize, data: usize },

    #[error("duplicate dimension: {0}")]
    DuplicateDimension(String),

    #[error("duplicate field: {0}")]
    DuplicateField(String),
}

/// Problems in a `CubeSchema` declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate dimension: {0}")]
    DuplicateDimension(String),

    #[error("duplicate field: {0}")]
    DuplicateField(String),

    #[error("name declared as both dimension and field: {0}")]
    Overlap(String),
}
