//! File serving under a single directory.
//!
//! Concurrent writes to the same name are not coordinated; the last writer
//! wins.

use std::fs::File;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error};

use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("invalid file name {0:?}")]
    InvalidName(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::InvalidName(_) | HandlerError::Read { .. } => StatusCode::NOT_FOUND,
            HandlerError::Create { .. } => StatusCode::BAD_REQUEST,
            HandlerError::Write { .. } => StatusCode::NOT_FOUND,
        }
    }
}

/// Reads and writes files below `root`.
///
/// All I/O is blocking `std::fs`, run inline on the calling task. Callers on
/// a shared runtime should keep payloads small or move the call onto
/// `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a file name from the URI onto the serving directory.
    ///
    /// Only plain relative names are accepted; `..`, absolute paths and the
    /// empty name are rejected.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, HandlerError> {
        let relative = Path::new(name);
        let plain = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !plain {
            return Err(HandlerError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(relative))
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, HandlerError> {
        let path = self.resolve(name)?;
        std::fs::read(&path).map_err(|source| HandlerError::Read { path, source })
    }

    /// Creates or truncates `name` and writes `data` into it.
    pub fn write(&self, name: &str, data: &[u8]) -> Result<(), HandlerError> {
        let path = self.resolve(name)?;
        let mut file = match File::create(&path) {
            Ok(file) => file,
            Err(source) => return Err(HandlerError::Create { path, source }),
        };
        file.write_all(data)
            .map_err(|source| HandlerError::Write { path, source })
    }

    /// `GET /files/<name>`
    pub fn read_file(&self, req: &Request, res: ResponseBuilder) -> Response {
        match self.read(file_name(req)) {
            Ok(content) => res
                .header("Content-Type", "application/octet-stream")
                .body(content)
                .send(),
            Err(e) => {
                debug!(error = %e, "File not served");
                res.status(e.status()).send()
            }
        }
    }

    /// `POST /files/<name>`
    pub fn write_file(&self, req: &Request, res: ResponseBuilder) -> Response {
        match self.write(file_name(req), &req.body) {
            Ok(()) => res.status(StatusCode::CREATED).send(),
            Err(e) => {
                error!(error = %e, "File not written");
                let status = match e {
                    HandlerError::InvalidName(_) => StatusCode::BAD_REQUEST,
                    ref other => other.status(),
                };
                res.status(status).send()
            }
        }
    }
}

fn file_name(req: &Request) -> &str {
    req.path.strip_prefix("/files/").unwrap_or("")
}
