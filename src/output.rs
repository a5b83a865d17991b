//! Saving decoded titles next to the project file

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::TitleError;
use crate::extractor::TitleDocument;

/// Name of the `number`-th (1-based) title file for a project file name.
///
/// `edit.prproj`, 2 gives `edit.prproj-title-002.xml`.
pub fn title_file_name(project_name: &OsStr, number: usize) -> OsString {
    let mut name = project_name.to_os_string();
    name.push(format!("-title-{:03}.xml", number));
    name
}

/// Writes titles as `<project>-title-NNN.xml` files
#[derive(Debug, Clone)]
pub struct TitleWriter {
    project: PathBuf,
    output_dir: Option<PathBuf>,
}

impl TitleWriter {
    /// Write next to `project`
    pub fn new(project: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            output_dir: None,
        }
    }

    /// Write into `dir` instead of the project's directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Path of the `number`-th (1-based) title file
    pub fn path_for(&self, number: usize) -> PathBuf {
        match &self.output_dir {
            Some(dir) => {
                let base = self.project.file_name().unwrap_or(OsStr::new("project"));
                dir.join(title_file_name(base, number))
            }
            None => PathBuf::from(title_file_name(self.project.as_os_str(), number)),
        }
    }

    /// Paths the given number of titles would be written to
    pub fn planned_paths(&self, count: usize) -> Vec<PathBuf> {
        (1..=count).map(|n| self.path_for(n)).collect()
    }

    /// Write every title, numbered in order, and return the written paths.
    ///
    /// Stops at the first file that cannot be written.
    pub fn write_all(&self, titles: &[TitleDocument]) -> Result<Vec<PathBuf>, TitleError> {
        let mut written = Vec::with_capacity(titles.len());
        for (i, title) in titles.iter().enumerate() {
            let path = self.path_for(i + 1);
            write_title(&path, title)?;
            debug!("wrote {} bytes to {}", title.as_bytes().len(), path.display());
            written.push(path);
        }
        Ok(written)
    }

    pub fn project(&self) -> &Path {
        &self.project
    }
}

fn write_title(path: &Path, title: &TitleDocument) -> Result<(), TitleError> {
    std::fs::write(path, title.as_bytes()).map_err(|source| TitleError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(data: &str) -> TitleDocument {
        TitleDocument {
            media_index: 0,
            data: data.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_file_name_is_zero_padded() {
        let name = OsStr::new("edit.prproj");
        assert_eq!(title_file_name(name, 1), "edit.prproj-title-001.xml");
        assert_eq!(title_file_name(name, 42), "edit.prproj-title-042.xml");
        assert_eq!(title_file_name(name, 1234), "edit.prproj-title-1234.xml");
    }

    #[test]
    fn test_path_next_to_project() {
        let writer = TitleWriter::new("/work/show/edit.prproj");
        assert_eq!(
            writer.path_for(3),
            PathBuf::from("/work/show/edit.prproj-title-003.xml")
        );
    }

    #[test]
    fn test_path_in_output_dir() {
        let writer = TitleWriter::new("/work/show/edit.prproj").with_output_dir("/tmp/out");
        assert_eq!(
            writer.planned_paths(2),
            vec![
                PathBuf::from("/tmp/out/edit.prproj-title-001.xml"),
                PathBuf::from("/tmp/out/edit.prproj-title-002.xml"),
            ]
        );
    }

    #[test]
    fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("a.prproj");
        let written = TitleWriter::new(&project)
            .write_all(&[title("<one/>"), title("<two/>")])
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read(&written[0]).unwrap(), b"<one/>");
        assert_eq!(std::fs::read(&written[1]).unwrap(), b"<two/>");
        assert!(dir.path().join("a.prproj-title-002.xml").exists());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = TitleWriter::new("a.prproj")
            .with_output_dir(dir.path().join("missing"))
            .write_all(&[title("<t/>")])
            .unwrap_err();
        assert!(matches!(err, TitleError::Write { .. }));
    }
}
