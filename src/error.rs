use std::fmt;

/// Errors produced while building, sending or parsing a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport failed to complete a single transfer.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// One member of a batch failed; the whole batch is discarded.
    #[error("batch request #{index} failed: {source}")]
    Batch {
        index: usize,
        #[source]
        source: TransportError,
    },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid proxy: {0}")]
    InvalidProxy(String),

    #[error("invalid method: {0}")]
    InvalidMethod(String),

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    /// Raw transport output could not be split into status line and headers.
    #[error("malformed header block: {0}")]
    MalformedHeaderBlock(String),

    /// The body announced itself as XML but did not parse.
    #[error("xml parse error: {0}")]
    Xml(#[from] xmltree::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Redirect,
    Body,
    Request,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Redirect => "redirect",
            Self::Body => "body",
            Self::Request => "request",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A failure reported by the underlying transport, carrying its message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_redirect() {
            TransportErrorKind::Redirect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else if err.is_builder() || err.is_request() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}
