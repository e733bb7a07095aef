//! Static file serving module
//!
//! Resolves request paths against the static root, guards against escaping
//! it, and builds cacheable file responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::ApiError;
use crate::http::{self, cache};
use crate::logger;

/// Serve `path` from `root` if a file matches.
///
/// `Ok(None)` means no match and the caller falls through to its 404.
pub async fn serve(
    root: &Path,
    path: &str,
    index_files: &[String],
    if_none_match: Option<&str>,
) -> Result<Option<Response<Full<Bytes>>>, ApiError> {
    let Some(file_path) = resolve(root, path, index_files).await else {
        return Ok(None);
    };

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return Ok(None);
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag).map(Some);
    }

    let content_type = content_type_for(&file_path);
    http::build_file_response(Bytes::from(content), &content_type, &etag).map(Some)
}

/// Map a URL path to a regular file inside `root`.
///
/// Dot-segments and hidden files never match. Directories resolve to their
/// first existing index file. The canonical result must stay under the
/// canonical root so symlinks cannot escape it.
pub async fn resolve(root: &Path, path: &str, index_files: &[String]) -> Option<PathBuf> {
    let decoded = urlencoding::decode(path).ok()?;
    let relative = decoded.trim_start_matches('/');

    if relative
        .split('/')
        .any(|segment| segment.starts_with('.') || segment.contains('\\'))
    {
        return None;
    }

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };

    let mut candidate = root.join(relative);
    if is_dir(&candidate).await {
        candidate = first_index_file(&candidate, index_files).await?;
    }

    // Missing files are the common case, not worth a log line
    let canonical = fs::canonicalize(&candidate).await.ok()?;
    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            canonical.display()
        ));
        return None;
    }

    let metadata = fs::metadata(&canonical).await.ok()?;
    metadata.is_file().then_some(canonical)
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn first_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for name in index_files {
        let index_path = dir.join(name);
        if fs::metadata(&index_path).await.is_ok_and(|m| m.is_file()) {
            return Some(index_path);
        }
    }
    None
}

/// Content type from the extension; textual types get an explicit charset
pub fn content_type_for(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let textual = mime.type_() == mime_guess::mime::TEXT
        || matches!(mime.subtype().as_str(), "javascript" | "json");
    if textual && mime.get_param(mime_guess::mime::CHARSET).is_none() {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}
