//! Static file serving on top of ordinary routes.
//!
//! Files are registered one `GET` route each, so they go through the same
//! tree, middleware and error handling as every other route.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};
use crate::router::{RouteHandle, Router, PARAM_PREFIX};

/// Content type guessed from the file extension
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// A directory that files are served from
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a URL path below the base directory; `..`, roots and
    /// prefixes are refused
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    /// Read the file at `url_path` relative to the base directory
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, content_type(&path)))
    }
}

/// Handler serving one file out of a [`StaticFiles`] directory
struct StaticFile {
    files: Arc<StaticFiles>,
    relative: String,
}

impl Handler for StaticFile {
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        match self.files.load(&self.relative) {
            Ok((bytes, ct)) => {
                res.status = 200;
                res.set_header("content-type", ct);
                res.body = bytes;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(request_id = %req.request_id, file = %self.relative, "Static file vanished");
                res.text(404, crate::dispatcher::NOT_FOUND_BODY);
            }
            Err(e) => {
                warn!(request_id = %req.request_id, file = %self.relative, error = %e, "Failed to read static file");
                res.json_error(500, &e.to_string());
            }
        }
    }
}

fn url_join(prefix: &str, relative: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if relative.is_empty() {
        if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{prefix}/{relative}")
    }
}

impl Router {
    /// Serve the file at `file` for `GET url_path`
    pub fn static_file(&mut self, url_path: &str, file: impl Into<PathBuf>) -> RouteHandle<'_> {
        let file: PathBuf = file.into();
        self.get(url_path, move |_req: &mut HandlerRequest, res: &mut HandlerResponse| {
            res.send_file(&file);
        })
    }

    /// Register a `GET` route for every file below `dir`, mounted at
    /// `prefix`.
    ///
    /// An `index.html` is also served at its directory's own path. Files
    /// with a path component starting with `:` are skipped. Returns the
    /// number of routes registered.
    ///
    /// # Errors
    ///
    /// Fails if `dir` cannot be walked.
    pub fn static_dir(&mut self, prefix: &str, dir: impl AsRef<Path>) -> io::Result<usize> {
        let dir = dir.as_ref();
        let files = Arc::new(StaticFiles::new(dir));
        let mut count = 0;
        for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let Some(relative) = relative.to_str() else {
                warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            let relative = relative.replace('\\', "/");
            if relative.split('/').any(|part| part.starts_with(PARAM_PREFIX)) {
                warn!(
                    path = %entry.path().display(),
                    "Skipping file whose name would register a parameter route"
                );
                continue;
            }

            let mut urls = vec![url_join(prefix, &relative)];
            if let Some(parent) = relative.strip_suffix("index.html") {
                if parent.is_empty() || parent.ends_with('/') {
                    urls.push(url_join(prefix, parent.trim_end_matches('/')));
                }
            }
            for url in urls {
                self.get(
                    &url,
                    StaticFile {
                        files: Arc::clone(&files),
                        relative: relative.clone(),
                    },
                );
                count += 1;
            }
        }
        info!(prefix = %prefix, dir = %dir.display(), routes = count, "Static directory mounted");
        Ok(count)
    }
}
