use thiserror::Error;

/// Failures contained at the single-document boundary. None of these
/// abort a batch; the pipeline logs the document and moves on.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Zero-byte or whitespace-only file.
    #[error("document is empty")]
    Empty,

    /// The file could not be read at all.
    #[error("document unreadable: {0}")]
    Unreadable(#[from] std::io::Error),

    /// The document text is not well-formed XML. This does NOT trigger
    /// the pattern-recovery tier — that tier only runs when a parse
    /// succeeds but yields zero transactions.
    #[error("malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),
}
