/// Convert Windows-style separators to POSIX separators.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Resolve `.` and `..` segments and collapse repeated separators.
pub fn clean_path(path: &str) -> String {
    let normalized = normalize_separators(path);
    let is_absolute = normalized.starts_with('/');

    let mut segments = Vec::new();
    for segment in normalized.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            segments.pop();
        } else {
            segments.push(segment);
        }
    }

    let joined = segments.join("/");
    if is_absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}
