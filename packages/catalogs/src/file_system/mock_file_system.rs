use crate::file_system::types::{FileStats, FileSystem, PodPath, ReadonlyFileSystem};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    unreadable: BTreeSet<String>,
}

/// In-memory pod storage.
///
/// Directories are created implicitly for every written file. Paths marked
/// with `set_unreadable` fail with `PermissionDenied` on read and list.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    tree: Arc<Mutex<Tree>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = MockFileSystem::default();
        fs.lock().dirs.insert("/".to_string());
        fs
    }

    pub fn init_with_files(&self, files: &[(&str, &str)]) {
        for (path, content) in files {
            // Writes to memory never fail.
            let _ = self.write_file(&PodPath::new(path), content.as_bytes());
        }
    }

    pub fn set_unreadable(&self, path: &str) {
        self.lock().unreadable.insert(PodPath::new(path).into_string());
    }

    /// Every file path currently stored, sorted.
    pub fn file_paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        match self.tree.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check_readable(tree: &Tree, path: &PodPath) -> io::Result<()> {
        if tree.unreadable.contains(path.as_str()) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is not readable", path),
            ));
        }
        Ok(())
    }
}

fn not_found(path: &PodPath) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path))
}

impl ReadonlyFileSystem for MockFileSystem {
    fn exists(&self, path: &PodPath) -> bool {
        let tree = self.lock();
        tree.files.contains_key(path.as_str()) || tree.dirs.contains(path.as_str())
    }

    fn read_file(&self, path: &PodPath) -> io::Result<String> {
        let buffer = self.read_file_buffer(path)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read_file_buffer(&self, path: &PodPath) -> io::Result<Vec<u8>> {
        let tree = self.lock();
        Self::check_readable(&tree, path)?;
        tree.files.get(path.as_str()).cloned().ok_or_else(|| not_found(path))
    }

    fn readdir(&self, path: &PodPath) -> io::Result<Vec<String>> {
        let tree = self.lock();
        Self::check_readable(&tree, path)?;
        if !tree.dirs.contains(path.as_str()) {
            return Err(not_found(path));
        }
        let children: BTreeSet<String> = tree
            .files
            .keys()
            .chain(tree.dirs.iter())
            .map(|p| PodPath::new(p))
            .filter(|p| p.as_str() != "/" && &p.dirname() == path)
            .map(|p| p.basename().to_string())
            .collect();
        Ok(children.into_iter().collect())
    }

    fn stat(&self, path: &PodPath) -> io::Result<FileStats> {
        let tree = self.lock();
        if tree.files.contains_key(path.as_str()) {
            Ok(FileStats {
                is_file: true,
                is_directory: false,
            })
        } else if tree.dirs.contains(path.as_str()) {
            Ok(FileStats {
                is_file: false,
                is_directory: true,
            })
        } else {
            Err(not_found(path))
        }
    }
}

impl FileSystem for MockFileSystem {
    fn write_file(&self, path: &PodPath, data: &[u8]) -> io::Result<()> {
        let mut tree = self.lock();
        if tree.dirs.contains(path.as_str()) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path),
            ));
        }
        let mut dir = path.dirname();
        loop {
            tree.dirs.insert(dir.as_str().to_string());
            if dir == PodPath::root() {
                break;
            }
            dir = dir.dirname();
        }
        tree.files.insert(path.as_str().to_string(), data.to_vec());
        Ok(())
    }

    fn remove_file(&self, path: &PodPath) -> io::Result<()> {
        self.lock()
            .files
            .remove(path.as_str())
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn ensure_dir(&self, path: &PodPath) -> io::Result<()> {
        let mut tree = self.lock();
        let mut dir = path.clone();
        loop {
            tree.dirs.insert(dir.as_str().to_string());
            if dir == PodPath::root() {
                break;
            }
            dir = dir.dirname();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_parent_directories_implicitly() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[("/content/pages/home.yaml", "a@: b"), ("/podspec.yaml", "")]);

        assert!(fs.stat(&PodPath::new("/content")).unwrap().is_directory());
        assert_eq!(
            fs.readdir(&PodPath::root()).unwrap(),
            vec!["content".to_string(), "podspec.yaml".to_string()]
        );
        assert_eq!(
            fs.readdir(&PodPath::new("/content/pages")).unwrap(),
            vec!["home.yaml".to_string()]
        );
    }

    #[test]
    fn should_fail_reads_of_unreadable_paths() {
        let fs = MockFileSystem::new();
        fs.init_with_files(&[("/views/a.html", "x")]);
        fs.set_unreadable("/views/a.html");

        let err = fs.read_file(&PodPath::new("/views/a.html")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(fs.exists(&PodPath::new("/views/a.html")));
    }
}
