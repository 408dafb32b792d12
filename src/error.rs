//! Error types for the CNAB codec.

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CnabError>;

/// Errors that can occur while building, rendering or parsing a CNAB file.
///
/// All of these are fatal to the operation that raised them; there is no
/// internal retry or silent recovery. The only softening point is lenient
/// rendering, which substitutes a `?` filler for missing values instead of
/// raising [`CnabError::MissingValue`].
#[derive(Error, Debug)]
pub enum CnabError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layout catalog JSON could not be parsed
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Construction requested an unregistered layout identifier
    #[error("unknown {shape} layout `{id}`")]
    UnknownLayout { id: String, shape: &'static str },

    /// Strict rendering encountered a field with no value
    #[error("field `{field}` has no value and strict rendering was requested")]
    MissingValue { field: String },

    /// A mutation was attempted on a block shape that does not support it
    #[error("operation `{operation}` is not supported on a {shape} block")]
    OperationNotSupported {
        operation: &'static str,
        shape: &'static str,
    },

    /// A container was mutated before its header/trailer templates existed
    #[error("container `{layout}` has an empty header or trailer template")]
    MissingHeaderOrTrailer { layout: String },

    /// Aggregate maintenance needed a field the loaded layout does not define
    #[error("layout `{layout}` does not define required field `{field}`")]
    SchemaFieldAbsent { layout: String, field: String },

    /// A value cannot be represented in its field (e.g. a negative number
    /// in an unsigned numeric field)
    #[error("field `{field}` cannot take value `{value}`")]
    InvalidValue { field: String, value: String },

    /// A numeric field slice contained non-digit characters
    #[error("line {line}: numeric field `{field}` contains `{found}`")]
    TypeMismatch {
        line: usize,
        field: String,
        found: String,
    },

    /// Lines arrived out of the expected header/record/trailer order
    #[error("line {line}: {reason}")]
    MalformedStructure { line: usize, reason: String },

    /// Input had fewer non-blank lines than the minimum viable file
    #[error("input has {found} non-blank lines, a CNAB file needs at least 5")]
    TooFewLines { found: usize },

    /// Missing input file argument
    #[error("Missing input file argument. Usage: cnab240 <remessa-file>")]
    MissingArgument,
}
