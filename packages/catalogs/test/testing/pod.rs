//! Fixture pod helpers
//!
//! Every test works on its own copy of `testdata/pod` in a temporary
//! directory, so tests can write catalogs freely.

#![allow(dead_code)]

use pod_catalogs::file_system::LocalFileSystem;
use pod_catalogs::logging::{CapturingLogger, LogLevel};
use pod_catalogs::Catalogs;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const FIXTURE_POD: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/test/testdata/pod");

pub fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

pub struct TestPod {
    pub dir: tempfile::TempDir,
    pub fs: Arc<LocalFileSystem>,
    pub logger: Arc<CapturingLogger>,
}

impl TestPod {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        copy_dir(Path::new(FIXTURE_POD), dir.path());
        let fs = Arc::new(LocalFileSystem::new(dir.path()));
        let logger = Arc::new(CapturingLogger::new(LogLevel::Debug));
        TestPod { dir, fs, logger }
    }

    pub fn catalogs(&self) -> Catalogs {
        Catalogs::new(self.fs.clone())
            .unwrap()
            .with_logger(self.logger.clone())
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative.trim_start_matches('/'))
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}
