use std::path::{Path, PathBuf};

/// Returns a "marked" sibling of `file`: the marker becomes a new dot-separated
/// segment right before the final extension.
///
/// `data/drinks.csv` => `data/drinks.marker.csv`. A file name without any dot
/// gets the marker appended as a terminal segment: `data/drinks` =>
/// `data/drinks.marker`.
pub fn marked_file_path(file: &Path, marker: &str) -> PathBuf {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let marked = match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}.{}.{}", stem, marker, ext),
        None => format!("{}.{}", name, marker),
    };

    file.with_file_name(marked)
}
