use log::debug;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Trait for the medium an alert document is persisted to
///
/// Implementations acquire and release the underlying resource within each
/// call; nothing is held open between operations.
#[cfg_attr(test, mockall::automock)]
pub trait StorageBackend {
    /// Read the raw document, `Ok(None)` if nothing has been stored yet
    fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the stored document with `contents`
    fn write(&self, contents: &[u8]) -> io::Result<()>;

    /// Human-readable location used in logs and errors
    fn location(&self) -> String;
}

/// Backend storing the document in a single JSON file
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No alert file at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, contents)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Backend keeping the document in memory
///
/// Useful for embedding the store where no file system is wanted, and in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: RefCell<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `contents`
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: RefCell::new(Some(contents.into())),
        }
    }

    /// Current stored bytes, if any
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.borrow().clone()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &[u8]) -> io::Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_backend_missing_file_reads_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("alerts.json"));

        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn test_file_backend_write_then_read() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("alerts.json"));

        backend.write(b"{}").unwrap();

        assert_eq!(backend.read().unwrap(), Some(b"{}".to_vec()));
        assert!(backend.location().ends_with("alerts.json"));
    }

    #[test]
    fn test_file_backend_reading_a_directory_fails() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(backend.read().is_err());
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        assert!(backend.read().unwrap().is_none());

        backend.write(b"data").unwrap();
        assert_eq!(backend.contents(), Some(b"data".to_vec()));
        assert_eq!(backend.location(), "<memory>");
    }
}
