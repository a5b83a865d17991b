//! Project document parsing
//!
//! A project file is plain XML with a `PremiereData` root. Media items
//! sit directly below the root as `Media` elements, and a media item may carry
//! an `ImporterPrefs` child holding base64 importer settings:
//!
//! ```text
//! <PremiereData Version="3">
//!   <Media ObjectUID="...">
//!     <ImporterPrefs Encoding="base64" Checksum="...">AAAA...</ImporterPrefs>
//!   </Media>
//! </PremiereData>
//! ```

use std::path::Path;

use tracing::debug;

use crate::element::Element;
use crate::error::{DocumentError, Result};

/// Tag name of the project root element
pub const PROJECT_ROOT: &str = "PremiereData";
/// Tag name of a media entry
pub const MEDIA_TAG: &str = "Media";
/// Tag name of an importer preference node
pub const IMPORTER_PREFS_TAG: &str = "ImporterPrefs";
/// The only `Encoding` attribute value that is decoded
pub const BASE64_ENCODING: &str = "base64";

const BOM: char = '\u{feff}';

/// A parsed project file whose root has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDocument {
    root: Element,
}

impl ProjectDocument {
    /// Parse raw file bytes into a project document.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected, and a
    /// leading byte-order mark is ignored.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(raw);
        let text = text.strip_prefix(BOM).unwrap_or(&text);
        let root = Element::parse_str(text)?;
        Self::from_root(root)
    }

    /// Read and parse a project file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)?;
        debug!("read {} bytes from {}", raw.len(), path.display());
        Self::parse(&raw)
    }

    /// Wrap an already built tree, checking the project root marker.
    pub fn from_root(root: Element) -> Result<Self> {
        if root.name() != PROJECT_ROOT {
            return Err(DocumentError::NotAProject {
                found: root.name().to_string(),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Media entries in document order
    pub fn media_entries(&self) -> impl Iterator<Item = MediaEntry<'_>> {
        self.root
            .children_named(MEDIA_TAG)
            .enumerate()
            .map(|(index, element)| MediaEntry { index, element })
    }
}

/// One `Media` element of a project.
#[derive(Debug, Clone, Copy)]
pub struct MediaEntry<'a> {
    index: usize,
    element: &'a Element,
}

impl<'a> MediaEntry<'a> {
    /// Zero-based position among the project's media entries
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// The entry's importer preference node, if any.
    ///
    /// Only the first `ImporterPrefs` child is considered.
    pub fn importer_prefs(&self) -> Option<ImporterPrefs<'a>> {
        self.element
            .child(IMPORTER_PREFS_TAG)
            .map(|element| ImporterPrefs { element })
    }
}

/// An `ImporterPrefs` element.
///
/// Many importers store their settings here; only some of those blobs are
/// titles.
#[derive(Debug, Clone, Copy)]
pub struct ImporterPrefs<'a> {
    element: &'a Element,
}

impl<'a> ImporterPrefs<'a> {
    pub fn encoding(&self) -> Option<&'a str> {
        self.element.attribute("Encoding")
    }

    /// Text content, `None` when absent or whitespace only
    pub fn text(&self) -> Option<&'a str> {
        self.element.text().filter(|t| !t.trim().is_empty())
    }

    /// The base64 text of this node if it is a decoding candidate.
    ///
    /// The `Encoding` comparison is exact and case-sensitive.
    pub fn base64_text(&self) -> Option<&'a str> {
        if self.encoding() != Some(BASE64_ENCODING) {
            return None;
        }
        self.text()
    }
}
