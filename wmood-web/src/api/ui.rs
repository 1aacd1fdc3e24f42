//! Browser assets
//!
//! Everything not matched by an API route is served from the static assets
//! folder; unknown paths get `index.html` so client-side routing works.

use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

pub fn static_files(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}
