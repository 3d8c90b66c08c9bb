#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("I/O error while reading dataset from stdin: {0}")]
    InputRead(#[source] std::io::Error),

    #[error("JSON parse error in dataset: {0}")]
    InputParse(#[source] serde_json::Error),

    #[error("Dataset does not match the expected schema: {0}")]
    InputSchema(#[source] serde_json::Error),

    #[error("Malformed operation at position {position}: {detail}")]
    MalformedOp { position: usize, detail: String },

    #[error("Unknown operation kind '{kind}' at position {position}. Expected: query, update")]
    UnknownOpKind { position: usize, kind: String },

    #[error("{what} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Dataset has no courses (N = 0), so there is no course to query")]
    NoCourses,

    #[error("Failed to serialize results: {0}")]
    OutputSerialize(#[source] serde_json::Error),

    #[error("I/O error while writing results: {0}")]
    OutputWrite(#[source] std::io::Error),
}

impl BenchError {
    /// Sorts a dataset decoding failure into I/O, syntax or schema classes.
    pub fn from_dataset_error(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Io => BenchError::InputRead(err.into()),
            Category::Syntax | Category::Eof => BenchError::InputParse(err),
            Category::Data => BenchError::InputSchema(err),
        }
    }
}
