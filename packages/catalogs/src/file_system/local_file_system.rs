use crate::file_system::types::{FileStats, FileSystem, PodPath, ReadonlyFileSystem};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Pod storage backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalFileSystem { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a pod path onto the disk.
    pub fn resolve(&self, path: &PodPath) -> PathBuf {
        let mut full_path = self.root.clone();
        for segment in path.as_str().split('/').filter(|s| !s.is_empty()) {
            full_path.push(segment);
        }
        full_path
    }
}

impl ReadonlyFileSystem for LocalFileSystem {
    fn exists(&self, path: &PodPath) -> bool {
        self.resolve(path).exists()
    }

    fn read_file(&self, path: &PodPath) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn read_file_buffer(&self, path: &PodPath) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }

    fn readdir(&self, path: &PodPath) -> io::Result<Vec<String>> {
        let mut result = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            result.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(result)
    }

    fn stat(&self, path: &PodPath) -> io::Result<FileStats> {
        let meta = fs::metadata(self.resolve(path))?;
        Ok(FileStats {
            is_file: meta.is_file(),
            is_directory: meta.is_dir(),
        })
    }
}

impl FileSystem for LocalFileSystem {
    fn write_file(&self, path: &PodPath, data: &[u8]) -> io::Result<()> {
        let full_path = self.resolve(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full_path, data)
    }

    fn remove_file(&self, path: &PodPath) -> io::Result<()> {
        fs::remove_file(self.resolve(path))
    }

    fn ensure_dir(&self, path: &PodPath) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path))
    }
}
