//! Session-scoped virtual filesystem the engine reads from and writes to.
//!
//! Names are flat keys (`image_3.png`, `list.txt`): anything that could
//! escape the session (separators, `..`) is rejected.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// Key -> bytes store shared with the engine for the duration of a job.
pub trait Vfs {
    /// Create or overwrite an entry.
    fn write_file(&mut self, name: &str, data: &[u8]) -> io::Result<()>;

    /// Read an entry's bytes.
    fn read_file(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Remove an entry.
    fn remove_file(&mut self, name: &str) -> io::Result<()>;

    /// Whether an entry exists.
    fn exists(&self, name: &str) -> bool;

    /// All entry names, sorted.
    fn list(&self) -> Vec<String>;
}

/// Reject names that are not a single flat path component.
pub fn check_name(name: &str) -> io::Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid VFS entry name '{name}'"),
        ));
    }
    Ok(())
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no VFS entry '{name}'"))
}

/// In-memory VFS.
#[derive(Debug, Default, Clone)]
pub struct MemoryVfs {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Vfs for MemoryVfs {
    fn write_file(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        check_name(name)?;
        self.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn read_file(&self, name: &str) -> io::Result<Vec<u8>> {
        check_name(name)?;
        self.files.get(name).cloned().ok_or_else(|| not_found(name))
    }

    fn remove_file(&mut self, name: &str) -> io::Result<()> {
        check_name(name)?;
        self.files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found(name))
    }

    fn exists(&self, name: &str) -> bool {
        check_name(name).is_ok() && self.files.contains_key(name)
    }

    fn list(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }
}

/// VFS backed by a private directory, removed again on drop.
///
/// The engine process runs with this directory as its working directory, so
/// entry names double as relative paths in engine arguments.
#[derive(Debug)]
pub struct DirVfs {
    root: PathBuf,
}

impl DirVfs {
    /// Create `stillreel-<uuid>` under `parent`.
    pub fn create_in(parent: &Path) -> io::Result<Self> {
        let root = parent.join(format!("stillreel-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "Created VFS session directory");
        Ok(Self { root })
    }

    /// Create a session under the system temp directory.
    pub fn create_temp() -> io::Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Session directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> io::Result<PathBuf> {
        check_name(name)?;
        Ok(self.root.join(name))
    }
}

impl Vfs for DirVfs {
    fn write_file(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        std::fs::write(self.path_of(name)?, data)
    }

    fn read_file(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.path_of(name)?)
    }

    fn remove_file(&mut self, name: &str) -> io::Result<()> {
        std::fs::remove_file(self.path_of(name)?)
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.root)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().is_file())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Drop for DirVfs {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            warn!(root = %self.root.display(), error = %e, "Failed to remove VFS session directory");
        }
    }
}
