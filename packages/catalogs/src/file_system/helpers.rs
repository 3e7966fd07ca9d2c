use crate::file_system::types::{PodPath, ReadonlyFileSystem};
use std::io;

/// Attempts made for a single read before giving up.
pub const READ_ATTEMPTS: usize = 3;

/// Read a file, retrying transient failures (`Interrupted`, `WouldBlock`,
/// `TimedOut`) up to `READ_ATTEMPTS` times.
pub fn read_with_retry(fs: &dyn ReadonlyFileSystem, path: &PodPath) -> io::Result<String> {
    let mut attempt = 1;
    loop {
        match fs.read_file(path) {
            Err(e) if attempt < READ_ATTEMPTS && is_transient(&e) => attempt += 1,
            result => return result,
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_system::types::FileStats;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyFileSystem {
        failures: usize,
        calls: AtomicUsize,
    }

    impl ReadonlyFileSystem for FlakyFileSystem {
        fn exists(&self, _path: &PodPath) -> bool {
            true
        }
        fn read_file(&self, _path: &PodPath) -> io::Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(io::Error::new(io::ErrorKind::Interrupted, "hiccup"))
            } else {
                Ok("content".to_string())
            }
        }
        fn read_file_buffer(&self, path: &PodPath) -> io::Result<Vec<u8>> {
            self.read_file(path).map(String::into_bytes)
        }
        fn readdir(&self, _path: &PodPath) -> io::Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn stat(&self, _path: &PodPath) -> io::Result<FileStats> {
            Ok(FileStats {
                is_file: true,
                is_directory: false,
            })
        }
    }

    #[test]
    fn should_retry_transient_failures() {
        let fs = FlakyFileSystem {
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        assert_eq!(read_with_retry(&fs, &PodPath::new("/a")).unwrap(), "content");
    }

    #[test]
    fn should_give_up_after_bounded_attempts() {
        let fs = FlakyFileSystem {
            failures: READ_ATTEMPTS,
            calls: AtomicUsize::new(0),
        };
        assert!(read_with_retry(&fs, &PodPath::new("/a")).is_err());
        assert_eq!(fs.calls.load(Ordering::SeqCst), READ_ATTEMPTS);
    }
}
