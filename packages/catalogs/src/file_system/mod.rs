//! File System Abstraction
//!
//! Pod files are addressed by POSIX paths rooted at the pod directory
//! (`/content/pages/home.yaml`). The engine only talks to the traits in
//! `types`; `LocalFileSystem` maps them onto a directory on disk and
//! `MockFileSystem` keeps everything in memory.

pub mod helpers;
pub mod local_file_system;
pub mod mock_file_system;
pub mod types;
pub mod util;

pub use helpers::*;
pub use local_file_system::*;
pub use mock_file_system::*;
pub use types::*;
pub use util::*;
