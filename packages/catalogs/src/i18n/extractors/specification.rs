//! Project specification (`podspec.yaml`).
//!
//! Tagged fields may appear anywhere in the file. They are global content.

use crate::file_system::PodPath;
use crate::i18n::extractors::{tagged_messages, ExtractedMessage};
use crate::locale::LocaleSet;
use serde_yaml::Value;

pub fn extract_specification(path: &PodPath, podspec: &Value, locales: &LocaleSet) -> Vec<ExtractedMessage> {
    tagged_messages(path, podspec, locales)
}
