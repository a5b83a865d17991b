//! Title extraction from a parsed project

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{PayloadError, TitleError};
use crate::payload::{EncodedPayload, DEFAULT_MARKER, HEADER_LEN};
use crate::project::{MediaEntry, ProjectDocument};

/// One decoded title: the inflated XML bytes, written out as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDocument {
    /// Zero-based index of the media entry the title came from
    pub media_index: usize,
    pub data: Vec<u8>,
}

impl TitleDocument {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Why a candidate blob was skipped.
#[derive(Debug)]
pub enum ItemWarning {
    /// Base64 decoding or inflating the blob failed.
    BadEncoding {
        media_index: usize,
        source: PayloadError,
    },
}

impl ItemWarning {
    pub fn media_index(&self) -> usize {
        match self {
            ItemWarning::BadEncoding { media_index, .. } => *media_index,
        }
    }

    pub fn cause(&self) -> &PayloadError {
        match self {
            ItemWarning::BadEncoding { source, .. } => source,
        }
    }
}

/// Titles found in one project, in document order, plus skipped items.
#[derive(Debug, Default)]
pub struct ExtractionResult {
    pub titles: Vec<TitleDocument>,
    pub warnings: Vec<ItemWarning>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }
}

/// What became of a single media entry.
#[derive(Debug)]
pub enum EntryOutcome {
    /// The entry carries no base64 importer blob.
    NoCandidate,
    /// The blob is not a title.
    NotATitle,
    Title(TitleDocument),
    Skipped(ItemWarning),
}

/// Finds and decodes compressed titles
#[derive(Debug, Clone)]
pub struct TitleExtractor {
    marker: String,
    header_len: usize,
}

impl TitleExtractor {
    /// Create an extractor for the standard title blob layout
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            header_len: HEADER_LEN,
        }
    }

    /// Use a different header marker text
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Use a different fixed header size
    pub fn with_header_len(mut self, header_len: usize) -> Self {
        self.header_len = header_len;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Decode every title in the project.
    ///
    /// Broken blobs are logged and recorded in [`ExtractionResult::warnings`];
    /// they never stop the scan. An empty result is not an error here.
    pub fn extract(&self, doc: &ProjectDocument) -> ExtractionResult {
        let mut result = ExtractionResult::default();

        for entry in doc.media_entries() {
            match self.extract_entry(&entry) {
                EntryOutcome::Title(title) => result.titles.push(title),
                EntryOutcome::Skipped(warning) => result.warnings.push(warning),
                EntryOutcome::NoCandidate | EntryOutcome::NotATitle => {}
            }
        }

        debug!(
            "found {} titles, skipped {} blobs",
            result.titles.len(),
            result.warnings.len()
        );
        result
    }

    /// Load a project file and decode its titles.
    ///
    /// Unlike [`extract`](Self::extract), a project without any title is
    /// reported as [`TitleError::NoTitlesFound`].
    pub fn extract_file(&self, path: &Path) -> Result<ExtractionResult, TitleError> {
        let doc = ProjectDocument::load(path)?;
        let result = self.extract(&doc);
        if result.is_empty() {
            return Err(TitleError::NoTitlesFound);
        }
        info!("{}: {} titles", path.display(), result.len());
        Ok(result)
    }

    /// Run the decode pipeline on one media entry
    pub fn extract_entry(&self, entry: &MediaEntry<'_>) -> EntryOutcome {
        let media_index = entry.index();
        let Some(text) = entry.importer_prefs().and_then(|p| p.base64_text()) else {
            return EntryOutcome::NoCandidate;
        };

        match self.decode_blob(text) {
            Ok(Some(data)) => {
                debug!("media #{}: decoded title ({} bytes)", media_index, data.len());
                EntryOutcome::Title(TitleDocument { media_index, data })
            }
            Ok(None) => {
                debug!("media #{}: importer blob is not a title", media_index);
                EntryOutcome::NotATitle
            }
            Err(source) => {
                warn!(
                    "unexpected title data format in media #{}, skipping: {}",
                    media_index,
                    error_chain(&source)
                );
                EntryOutcome::Skipped(ItemWarning::BadEncoding {
                    media_index,
                    source,
                })
            }
        }
    }

    /// Base64-decode, sniff the header and inflate. `Ok(None)` when the
    /// header does not carry the marker.
    pub fn decode_blob(&self, text: &str) -> Result<Option<Vec<u8>>, PayloadError> {
        let payload = EncodedPayload::from_base64(text)?;
        if !payload.has_marker(&self.marker, self.header_len) {
            return Ok(None);
        }
        payload.inflate(self.header_len).map(Some)
    }
}

impl Default for TitleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
