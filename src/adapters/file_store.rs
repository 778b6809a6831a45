use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::CartError;
use crate::ports::PersistentStore;

/// File-backed persistent store with OS-specific paths.
///
/// Each key maps to one file under the application data directory. Keys
/// are namespaced strings like `@storecart:cart`; characters that are not
/// filesystem-safe are replaced when deriving the file name.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Create a new FileStore under the OS-specific application data
    /// directory.
    pub fn new() -> Result<Self, CartError> {
        let data_dir = Self::default_data_dir()?;
        Self::at(data_dir)
    }

    /// Create a FileStore rooted at an explicit directory.
    pub fn at(data_dir: PathBuf) -> Result<Self, CartError> {
        fs::create_dir_all(&data_dir)?;
        info!(data_dir = ?data_dir, "FileStore initialized");
        Ok(Self { data_dir })
    }

    /// OS-specific application data directory.
    /// - macOS: ~/Library/Application Support/Storecart/
    /// - Windows: %APPDATA%\Storecart\
    /// - Linux: ~/.local/share/Storecart/
    fn default_data_dir() -> Result<PathBuf, CartError> {
        dirs::data_dir()
            .map(|p| p.join("Storecart"))
            .ok_or_else(|| {
                CartError::Config("Could not find application data directory".to_string())
            })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.data_dir.join(format!("{name}.json"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl PersistentStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(key = key, path = ?path, len = bytes.len(), "Store read");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), CartError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a temp file first, then rename, so a crash mid-write
        // never leaves a truncated value behind.
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        debug!(key = key, path = ?path, len = value.len(), "Store write");
        Ok(())
    }
}
