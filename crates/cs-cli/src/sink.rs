//! Saving delivered certificates to a directory on disk.

use std::fs;
use std::path::{Path, PathBuf};

use cs_state::{CertificateDocument, DocumentSink, SinkError};

/// Writes each delivered document to `<dir>/<file name>`, or to
/// `<dir>/<language>/<file name>` when split by language.
///
/// Without the split a later download overwrites an earlier one, like a
/// browser saving a file under the same name.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    per_language: bool,
    saved: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            per_language: false,
            saved: Vec::new(),
        }
    }

    /// A sink giving every language its own subdirectory.
    pub fn per_language(dir: impl Into<PathBuf>) -> Self {
        Self {
            per_language: true,
            ..Self::new(dir)
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in order.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl DocumentSink for FileSink {
    fn save(&mut self, document: &CertificateDocument) -> Result<(), SinkError> {
        let io_err = |source| SinkError::Io {
            file_name: document.file_name.to_string(),
            source,
        };
        let target = if self.per_language {
            self.dir.join(document.language.code())
        } else {
            self.dir.clone()
        };
        fs::create_dir_all(&target).map_err(io_err)?;
        let path = target.join(document.file_name);
        fs::write(&path, &document.bytes).map_err(io_err)?;
        tracing::debug!(path = %path.display(), size = document.bytes.len(), "certificate saved");
        self.saved.push(path);
        Ok(())
    }
}
