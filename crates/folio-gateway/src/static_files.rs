//! Built front end serving for production deployments.

use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

const INDEX_FILE: &str = "index.html";

/// Serve files under `public_dir`, answering unmatched paths with its
/// `index.html` so client-side routes resolve.
pub(crate) fn spa_service(public_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join(INDEX_FILE)))
}

/// Whether `public_dir` holds a built front end.
pub(crate) fn has_index(public_dir: &Path) -> bool {
    public_dir.join(INDEX_FILE).is_file()
}
