use thiserror::Error;

#[derive(Error, Debug)]
pub enum BalanceError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Data error in row {row}: {message}")]
    DataError { row: usize, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl BalanceError {
    /// Data error pointing at a 1-based data row of the input table.
    pub fn data(row: usize, message: impl Into<String>) -> Self {
        BalanceError::DataError {
            row,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BalanceError>;
