use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, StatError};

// ---------------------------------------------------------------------------
// FileExtension – the closed set of recognised file types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileExtension {
    Csv,
    Excel,
    ExcelOld,
    Json,
    Txt,
}

impl FileExtension {
    pub const ALL: [FileExtension; 5] = [
        FileExtension::Csv,
        FileExtension::Excel,
        FileExtension::ExcelOld,
        FileExtension::Json,
        FileExtension::Txt,
    ];

    /// The suffix this tag matches, dot included.
    pub fn suffix(self) -> &'static str {
        match self {
            FileExtension::Csv => ".csv",
            FileExtension::Excel => ".xlsx",
            FileExtension::ExcelOld => ".xls",
            FileExtension::Json => ".json",
            FileExtension::Txt => ".txt",
        }
    }

    /// Exact, case-sensitive lookup of a dotted suffix such as `".csv"`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ext| ext.suffix() == suffix)
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

// ---------------------------------------------------------------------------
// FileHandle – an existing file plus its extension tag
// ---------------------------------------------------------------------------

/// A path that pointed at a regular file when the handle was built.
///
/// The check is not repeated later: if the file is removed afterwards the
/// handle goes stale and the next read fails with an I/O error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    path: PathBuf,
}

impl FileHandle {
    /// Fails with [`StatError::NotFound`] unless `path` is a regular file.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(StatError::NotFound { path });
        }
        Ok(Self { path })
    }

    /// `true` iff the file still exists and carries a recognised suffix.
    pub fn validate(&self) -> bool {
        self.path.is_file() && self.suffix().is_some()
    }

    /// Extension tag of the file name, `None` when it is not recognised.
    pub fn suffix(&self) -> Option<FileExtension> {
        let ext = self.path.extension()?.to_str()?;
        FileExtension::from_suffix(&format!(".{ext}"))
    }

    /// The path exactly as it was given.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
