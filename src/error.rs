use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RecommendError>;

/// Failures of the build pipeline and its collaborators.
///
/// A query title with no match is NOT represented here: `recommend`
/// returns `None` for that, since it is an expected outcome the caller
/// branches on, not a fault.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// The catalog source is missing, empty, or malformed. Fatal to
    /// startup; nothing can be built from it.
    #[error("failed to load catalog from {path}: {message}")]
    DataLoad { path: String, message: String },

    /// Every term of every document was filtered out (stop-words only,
    /// or an empty corpus). Fatal to the build.
    #[error("corpus yields an empty vocabulary; nothing to index")]
    EmptyVocabulary,

    /// A rebuild was abandoned through its cancellation flag. All
    /// partial state has been discarded.
    #[error("build cancelled")]
    Cancelled,

    /// A persisted model could not be read or decoded.
    #[error("snapshot error: {message}")]
    Snapshot { message: String },
}
