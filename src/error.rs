use thiserror::Error;

/// Errors that can occur while loading, parsing, serializing, or publishing
/// Atom documents.
///
/// All variants abort the in-progress operation immediately and propagate to
/// the caller; nothing is retried internally. Unknown XML elements and
/// attributes are *not* errors — they are silently skipped so that documents
/// carrying extension namespaces keep parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// A loader was given something it cannot work with, e.g. a URL with a
    /// non-HTTP(S) scheme or a byte stream that is not valid UTF-8.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The document's root element does not match the entity being
    /// constructed (wrong local name or namespace).
    #[error("XML document was missing <{expected}> (found {found})")]
    InvalidDocument { expected: String, found: String },

    /// The underlying XML reader reported a structural error (malformed
    /// markup). The line number points at the failure in the source text.
    #[error("XML parse error: {message} at line {line}")]
    Parse { message: String, line: usize },

    /// Serializing a document failed.
    #[error("XML write error: {0}")]
    Write(String),

    /// Reading an input stream failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP failure (DNS, connection, TLS, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An HTTP response to a protocol operation had a non-success status.
    /// Carries the status and response body for caller inspection.
    #[error("protocol error: HTTP status {status}")]
    Protocol { status: u16, body: String },

    /// A protocol operation was attempted on an entity that lacks the
    /// required link, e.g. updating an entry that has no edit link.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
}
