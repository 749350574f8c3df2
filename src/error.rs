/// Errors produced by the matrix, network, serialization and dataset code.
///
/// Every fallible operation in the library returns `Result<T>`; nothing in
/// the numeric core panics on bad shapes or bad input data.
#[derive(thiserror::Error, Debug)]
pub enum NnError {
    /// Operand shapes are incompatible for `op`. Shapes are `(rows, columns)`.
    #[error("dimension mismatch in {op}: {}x{} vs {}x{}", left.0, left.1, right.0, right.1)]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("buffer has {actual} elements, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("malformed serialized data: {0}")]
    MalformedSerializedData(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NnError {
    pub(crate) fn malformed(msg: impl std::fmt::Display) -> Self {
        NnError::MalformedSerializedData(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NnError>;
