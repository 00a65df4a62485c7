use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the single durable entry holding the application state.
pub const STORAGE_KEY: &str = "repertoire-state";

/// A single-key durable store. Each write replaces the whole entry.
pub trait Storage {
    /// `Ok(None)` when nothing has been written yet.
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&self, contents: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Stores the entry as `<dir>/repertoire-state.json`.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STORAGE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        // Write beside the entry, then rename over it so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-process storage, for ephemeral sessions and tests.
#[derive(Default)]
pub struct MemoryStorage {
    slot: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.slot.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}
