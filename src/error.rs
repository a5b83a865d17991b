//! Error types for project parsing and title extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Why a project file could not be turned into a document tree.
#[derive(Debug, Error)]
pub enum LoadCause {
    /// The file could not be read.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The XML reader rejected the input.
    #[error("XML error")]
    Xml(#[from] quick_xml::Error),

    /// The markup was readable but does not form a single element tree.
    #[error("malformed document: {0}")]
    Structure(String),
}

/// Document-level failures. Both variants end the run.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file is unreadable or is not XML.
    #[error("cannot load project file")]
    LoadFailed {
        #[source]
        source: LoadCause,
    },

    /// The file is XML, but its root is not a project root.
    #[error("invalid project file (root element is <{found}>)")]
    NotAProject { found: String },
}

impl DocumentError {
    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        DocumentError::LoadFailed {
            source: LoadCause::Structure(msg.into()),
        }
    }
}

impl From<LoadCause> for DocumentError {
    fn from(source: LoadCause) -> Self {
        DocumentError::LoadFailed { source }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(e: std::io::Error) -> Self {
        LoadCause::Io(e).into()
    }
}

impl From<quick_xml::Error> for DocumentError {
    fn from(e: quick_xml::Error) -> Self {
        LoadCause::Xml(e).into()
    }
}

/// Failure to decode one embedded payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The node text is not base64.
    #[error("invalid base64 data")]
    Base64(#[from] base64::DecodeError),

    /// The bytes after the header are not a zlib stream.
    #[error("zlib inflate failed")]
    Inflate(#[from] flate2::DecompressError),

    /// The zlib stream ended before its final block.
    #[error("zlib stream truncated after {consumed} bytes")]
    Truncated { consumed: u64 },
}

/// Aggregate errors reported by a whole extraction run.
#[derive(Debug, Error)]
pub enum TitleError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Extraction finished without decoding a single title.
    #[error("there is no title in this project")]
    NoTitlesFound,

    /// A decoded title could not be saved.
    #[error("cannot write title file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A convenience `Result` alias for document-level operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
