use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::common::{FileId, Result, StorageError};

use super::file::FileHandle;

/// The database directory: resolves named heap files to on-disk paths and
/// assigns each freshly opened `FileHandle` a unique `FileId` for the
/// lifetime of that handle. Mirrors the `Db` collaborator of `spec.md` §6 —
/// `createFile`/`openFile`/`closeFile`/`destroyFile` — which the core treats
/// as an external boundary.
pub struct Db {
    root: PathBuf,
    next_file_id: Cell<u32>,
}

impl Db {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            next_file_id: Cell::new(0),
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Creates a new, empty named file. Errors if a file by that name
    /// already exists.
    pub fn create_file(&self, name: &str) -> Result<()> {
        let path = self.resolve(name);
        if path.exists() {
            return Err(StorageError::FileExists);
        }
        std::fs::File::create(&path)?;
        Ok(())
    }

    /// Opens an existing named file, handing out a fresh `FileId`.
    pub fn open_file(&self, name: &str) -> Result<FileHandle> {
        let path = self.resolve(name);
        let id = FileId(self.next_file_id.get());
        self.next_file_id.set(id.0 + 1);
        FileHandle::open(id, name, path)
    }

    /// Closes a file. Callers must have already unpinned and flushed any
    /// pages of this file held in the buffer pool; closing simply drops
    /// the underlying OS handle.
    pub fn close_file(&self, file: FileHandle) -> Result<()> {
        drop(file);
        Ok(())
    }

    /// Removes a named file from disk entirely.
    pub fn destroy_file(&self, name: &str) -> Result<()> {
        let path = self.resolve(name);
        std::fs::remove_file(path)?;
        Ok(())
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.resolve(name).exists()
    }
}
