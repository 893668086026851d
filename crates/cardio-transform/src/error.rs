use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Composite key occurs more than once where it must be unique.
    #[error("duplicate key ({columns}) = ({key}) in {stage}: {count} rows")]
    DuplicateKey {
        stage: String,
        columns: String,
        key: String,
        count: usize,
    },

    /// Both sides of a join repeat the same key.
    #[error("many-to-many join on ({columns}) for key ({key})")]
    ManyToManyJoin { columns: String, key: String },

    /// A non-key column exists on both sides of a join.
    #[error("column '{column}' present on both sides of join")]
    ColumnCollision { column: String },

    #[error("column '{column}' not found")]
    MissingColumn { column: String },

    /// Cell that cannot be parsed into the column's expected type.
    #[error("invalid {expected} value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        value: String,
        row: usize,
        expected: &'static str,
    },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
