use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::metrics::ResourceMetrics;

use super::paths::{base_path, join_resource};

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResourceError {
    pub fn path(&self) -> &Path {
        match self {
            ResourceError::Read { path, .. } | ResourceError::Write { path, .. } => path,
        }
    }
}

/// Reads a whole file.
pub fn load_bytes(path: &Path) -> Result<Vec<u8>, ResourceError> {
    fs::read(path).map_err(|source| ResourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `bytes` to `path`, replacing any existing file.
///
/// Open, write and flush failures are all reported.
pub fn save_bytes(path: &Path, bytes: &[u8]) -> Result<(), ResourceError> {
    let write_err = |source| ResourceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(path).map_err(write_err)?;
    file.write_all(bytes).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    Ok(())
}

/// Resource access rooted at one directory, with load/save accounting.
#[derive(Debug)]
pub struct Resources {
    root: PathBuf,
    metrics: ResourceMetrics,
}

impl Resources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            metrics: ResourceMetrics::new(),
        }
    }

    /// Resources rooted at the process-wide [`base_path`].
    pub fn from_base_path() -> Self {
        Self::new(base_path())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metrics(&self) -> &ResourceMetrics {
        &self.metrics
    }

    /// Absolute path of a resource-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        join_resource(&self.root, relative)
    }

    pub fn load(&self, relative: &str) -> Result<Vec<u8>, ResourceError> {
        let bytes = load_bytes(&self.path(relative))?;
        self.metrics.record_load(bytes.len());
        Ok(bytes)
    }

    /// Like [`load`](Self::load) but never fails: a missing or unreadable
    /// file is logged and yields an empty buffer. Callers check the length.
    pub fn load_or_empty(&self, relative: &str) -> Vec<u8> {
        match self.load(relative) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("{err}: {}", err_source(&err));
                Vec::new()
            }
        }
    }

    pub fn save(&self, relative: &str, bytes: &[u8]) -> Result<(), ResourceError> {
        save_bytes(&self.path(relative), bytes)?;
        self.metrics.record_save(bytes.len());
        Ok(())
    }
}

fn err_source(err: &ResourceError) -> String {
    match err {
        ResourceError::Read { source, .. } | ResourceError::Write { source, .. } => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let res = Resources::new(dir.path());

        let bytes = res.load_or_empty("does/not/exist.bin");
        assert!(bytes.is_empty());
        assert_eq!(res.metrics().snapshot().file_loads, 0);
    }

    #[test]
    fn missing_file_is_an_error_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let res = Resources::new(dir.path());

        let err = res.load("nope.txt").unwrap_err();
        assert!(matches!(err, ResourceError::Read { .. }));
        assert_eq!(err.path(), dir.path().join("nope.txt"));
    }

    #[test]
    fn saved_resource_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let res = Resources::new(dir.path());

        res.save("blob.bin", &[1, 2, 3, 4]).unwrap();
        assert_eq!(res.load("blob.bin").unwrap(), vec![1, 2, 3, 4]);

        let s = res.metrics().snapshot();
        assert_eq!(s.file_saves, 1);
        assert_eq!(s.bytes_saved, 4);
        assert_eq!(s.file_loads, 1);
        assert_eq!(s.bytes_loaded, 4);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.bin");

        let err = save_bytes(&path, b"x").unwrap_err();
        assert!(matches!(err, ResourceError::Write { .. }));
    }
}
