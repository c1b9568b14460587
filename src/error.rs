use thiserror::Error;

/// Failure to read or parse one of the input files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse pattern list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse statistics: {0}")]
    Csv(#[from] csv::Error),

    #[error("statistics header has no {0} column")]
    MissingColumn(String),

    #[error("line {line}: counter {name} has malformed value {value:?}")]
    MalformedValue {
        line: u64,
        name: String,
        value: String,
    },
}

/// Inconsistency between the counter stream and the kernel labels
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReduceError {
    #[error(
        "counters describe configuration {index}, but the pattern list only has {len} entries"
    )]
    KernelIndex { index: usize, len: usize },

    #[error("configuration {index}: doubled byte count of {value} overflows")]
    ByteOverflow { index: usize, value: u64 },
}
