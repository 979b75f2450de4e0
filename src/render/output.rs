//! Where finished pages go.

use std::fs;
use std::path::Path;

use crate::config::NewlineKind;
use crate::error::{DocumenterError, Result};

/// Destination for rendered pages.
pub trait PageWriter {
    fn write_page(&mut self, path: &Path, content: &str) -> Result<()>;
}

/// Writes pages to disk, converting line endings on the way.
#[derive(Debug, Clone, Copy)]
pub struct FsPageWriter {
    newline: NewlineKind,
}

impl FsPageWriter {
    pub fn new(newline: NewlineKind) -> Self {
        Self { newline }
    }
}

impl PageWriter for FsPageWriter {
    fn write_page(&mut self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, self.newline.apply(content))
            .map_err(|e| DocumenterError::io(format!("failed to write {}", path.display()), e))
    }
}
