//! # prproj-titles
//!
//! Extracts titles embedded in Premiere Pro project files.
//!
//! A `.prproj` file is an XML document. Titles built with the legacy title
//! tool are not stored as XML elements but as binary blobs in the text of
//! `<ImporterPrefs Encoding="base64">` nodes under `<Media>` elements.
//!
//! ## Blob Layout
//!
//! ```text
//! base64( [32-byte header containing "CompressedTitle"] [zlib stream] )
//! ```
//!
//! The zlib stream inflates to a standalone XML document describing the
//! title. The rest of the header is opaque.
//!
//! ## Detection Rules
//!
//! For each `Media` element, in document order:
//! 1. No `ImporterPrefs`, `Encoding` other than `base64`, or empty text → ignored
//! 2. Header does not contain the marker → ignored (another importer's settings)
//! 3. Base64 or inflate failure → warning, entry skipped
//! 4. Otherwise → one title
//!
//! Many importers share `ImporterPrefs`, so a bad blob never aborts the
//! scan. A project in which nothing decodes is reported as
//! [`TitleError::NoTitlesFound`] by [`TitleExtractor::extract_file`].
//!
//! ```no_run
//! use std::path::Path;
//! use prproj_titles::{TitleExtractor, TitleWriter};
//!
//! let project = Path::new("edit.prproj");
//! let result = TitleExtractor::new().extract_file(project)?;
//! let written = TitleWriter::new(project).write_all(&result.titles)?;
//! println!("{} titles saved", written.len());
//! # Ok::<(), prproj_titles::TitleError>(())
//! ```

pub mod element;
pub mod error;
pub mod extractor;
pub mod output;
pub mod payload;
pub mod project;

pub use element::Element;
pub use error::{DocumentError, LoadCause, PayloadError, TitleError};
pub use extractor::{EntryOutcome, ExtractionResult, ItemWarning, TitleDocument, TitleExtractor};
pub use output::{title_file_name, TitleWriter};
pub use payload::{EncodedPayload, DEFAULT_MARKER, HEADER_LEN};
pub use project::{ImporterPrefs, MediaEntry, ProjectDocument};
