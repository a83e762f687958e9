//! Error types for the ingestion pipeline and the store layer.
//!
//! Each pipeline stage has its own error type. [`Error`] wraps them with
//! the stage that failed; an ingestion run stops at the first one.

use thiserror::Error;

/// Download of the remote feed failed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid proxy address '{proxy}'")]
    Proxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read feed file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The payload was not a valid gzip stream.
#[derive(Error, Debug)]
pub enum DecompressError {
    #[error("payload is not gzip-compressed (missing magic bytes)")]
    NotGzip,

    #[error("corrupt gzip stream")]
    Corrupt(#[source] std::io::Error),
}

/// The feed document is structurally invalid.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("feed has no root element")]
    Empty,

    #[error("unexpected root element <{0}>, expected <cpe-list>")]
    UnexpectedRoot(String),

    #[error("document ended inside <{0}>")]
    Truncated(String),

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("cpe-item '{item}' has no cpe23-item element")]
    MissingCpe23 { item: String },
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        ParseError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::Xml(e.to_string())
    }
}

/// A CPE name could not be unbound into a well-formed name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert '{input}': {reason}")]
pub struct ConversionError {
    pub reason: String,
    pub input: String,
}

impl ConversionError {
    pub fn new(reason: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            input: input.into(),
        }
    }
}

/// A store operation (connect, insert, query, close) failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error")]
    Sqlx(#[from] sqlx::Error),

    #[error("failed to prepare database location {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("store '{0}' is closed")]
    Closed(String),

    #[error("{0}")]
    Backend(String),
}

/// The configured store technology is not known.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid database dialect '{0}' (expected sqlite3 or memory)")]
pub struct InvalidDialectError(pub String);

/// Failure of an ingestion run, tagged with the stage that failed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to fetch CPE dictionary")]
    Fetch(#[from] FetchError),

    #[error("failed to decompress CPE dictionary")]
    Decompress(#[from] DecompressError),

    #[error("failed to parse CPE dictionary")]
    Parse(#[from] ParseError),

    #[error("failed to normalize CPE name")]
    Conversion(#[from] ConversionError),

    #[error("failed to insert chunk {chunk} ({committed} records already committed)")]
    Store {
        chunk: usize,
        committed: usize,
        #[source]
        source: StoreError,
    },

    #[error("failed to open store")]
    Open(#[source] StoreError),

    #[error(transparent)]
    InvalidDialect(#[from] InvalidDialectError),
}
