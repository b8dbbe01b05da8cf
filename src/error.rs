use thiserror::Error;

/// Errors surfaced by input loading and the clustering driver.
#[derive(Debug, Error)]
pub enum Error {
    /// Input contains no objects.
    #[error("empty input")]
    EmptyInput,

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_objects} objects")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of objects in the dataset.
        n_objects: usize,
    },

    /// Command-line argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Dissimilarity-matrix stream is malformed.
    #[error("bad matrix file format: {0}")]
    MatrixFormat(String),

    /// Vectors stream is malformed.
    #[error("bad vectors file format: {0}")]
    VectorsFormat(String),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A fabric collective failed. `op` names the collective.
    #[error("fabric collective '{op}' failed: {message}")]
    Fabric {
        /// Name of the collective operation.
        op: &'static str,
        /// Backend-provided failure description.
        message: String,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
