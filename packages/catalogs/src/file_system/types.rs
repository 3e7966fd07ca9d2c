use crate::file_system::util::clean_path;
use std::io;

/// A path inside the pod, in POSIX form and always starting with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PodPath(String);

impl PodPath {
    pub fn new(path: impl AsRef<str>) -> Self {
        let cleaned = clean_path(path.as_ref());
        if cleaned.starts_with('/') {
            PodPath(cleaned)
        } else {
            PodPath(format!("/{}", cleaned))
        }
    }

    pub fn root() -> Self {
        PodPath("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn join(&self, segment: &str) -> PodPath {
        PodPath::new(format!("{}/{}", self.0.trim_end_matches('/'), segment))
    }

    /// Parent directory; the root is its own parent.
    pub fn dirname(&self) -> PodPath {
        match self.0.rfind('/') {
            Some(0) | None => PodPath::root(),
            Some(i) => PodPath(self.0[..i].to_string()),
        }
    }

    pub fn basename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Lower-cased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.basename();
        match name.rfind('.') {
            Some(i) if i > 0 => Some(name[i + 1..].to_ascii_lowercase()),
            _ => None,
        }
    }

    pub fn starts_with_dir(&self, dir: &str) -> bool {
        let dir = dir.trim_end_matches('/');
        self.0.len() > dir.len() && self.0.starts_with(dir) && self.0.as_bytes()[dir.len()] == b'/'
    }
}

impl AsRef<str> for PodPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PodPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PodPath {
    fn from(path: &str) -> Self {
        PodPath::new(path)
    }
}

/// Information about an object in the file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub is_file: bool,
    pub is_directory: bool,
}

impl FileStats {
    pub fn is_file(&self) -> bool {
        self.is_file
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
}

/// The read-only side of the pod storage.
pub trait ReadonlyFileSystem: Send + Sync {
    fn exists(&self, path: &PodPath) -> bool;
    fn read_file(&self, path: &PodPath) -> io::Result<String>;
    fn read_file_buffer(&self, path: &PodPath) -> io::Result<Vec<u8>>;
    /// Names of the direct children of a directory, in no particular order.
    fn readdir(&self, path: &PodPath) -> io::Result<Vec<String>>;
    fn stat(&self, path: &PodPath) -> io::Result<FileStats>;
}

/// Access to the read-only side of a storage trait object.
pub trait AsReadonly {
    fn as_readonly(&self) -> &dyn ReadonlyFileSystem;
}

impl<T: ReadonlyFileSystem> AsReadonly for T {
    fn as_readonly(&self) -> &dyn ReadonlyFileSystem {
        self
    }
}

/// Pod storage that can also be written to.
pub trait FileSystem: ReadonlyFileSystem + AsReadonly {
    fn write_file(&self, path: &PodPath, data: &[u8]) -> io::Result<()>;
    fn remove_file(&self, path: &PodPath) -> io::Result<()>;
    fn ensure_dir(&self, path: &PodPath) -> io::Result<()>;
}
