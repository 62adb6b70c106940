use std::path::Path;

/// Lowercase extension of `filename` without the dot.
#[must_use]
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}
