use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Storage for the single route cache file.
pub trait CacheFile: Send + Sync + fmt::Debug {
    /// Whether the file exists.
    fn exists(&self) -> bool;

    /// Read the whole file.
    ///
    /// # Errors
    ///
    /// Any I/O error.
    fn read(&self) -> io::Result<Vec<u8>>;

    /// Replace the whole file.
    ///
    /// # Errors
    ///
    /// Any I/O error.
    fn write(&self, bytes: &[u8]) -> io::Result<()>;

    /// Delete the file; deleting a missing file succeeds.
    ///
    /// # Errors
    ///
    /// Any I/O error other than "not found".
    fn remove(&self) -> io::Result<()>;

    /// Human readable location, for logs.
    fn location(&self) -> String;
}

/// Cache file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsCacheFile {
    path: PathBuf,
}

impl FsCacheFile {
    /// Cache file at `path`; parent directories are created on write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheFile for FsCacheFile {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
