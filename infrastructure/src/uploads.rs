//! Reading upload candidates from disk
//!
//! A path argument is either a single file, uploaded under its file name,
//! or a folder, whose regular files are uploaded recursively under their
//! path relative to the folder. Hidden files and folders are skipped.

use glob::{MatchOptions, Pattern};
use ragchat_application::{UploadSource, UploadSourceError};
use ragchat_domain::UploadFile;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum UploadCollectError {
    #[error("{}: no such file or folder", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to scan {}: {message}", .path.display())]
    Scan { path: PathBuf, message: String },
}

/// Collect every file named by `paths`, in argument order then path order.
pub fn collect_uploads(paths: &[PathBuf]) -> Result<Vec<UploadFile>, UploadCollectError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(collect_folder(path)?);
        } else if path.is_file() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            files.push(UploadFile::new(name, read(path)?));
        } else {
            return Err(UploadCollectError::NotFound(path.clone()));
        }
    }
    Ok(files)
}

/// [`UploadSource`] backed by the local file system
pub struct LocalUploadSource;

impl UploadSource for LocalUploadSource {
    fn collect(&self, paths: &[PathBuf]) -> Result<Vec<UploadFile>, UploadSourceError> {
        collect_uploads(paths).map_err(|e| UploadSourceError(e.to_string()))
    }
}

fn collect_folder(dir: &Path) -> Result<Vec<UploadFile>, UploadCollectError> {
    let pattern = format!(
        "{}/**/*",
        Pattern::escape(&dir.to_string_lossy()).trim_end_matches('/')
    );
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob::glob_with(&pattern, options).map_err(|e| UploadCollectError::Scan {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| UploadCollectError::Scan {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        if path.is_file() && !is_hidden(relative) {
            paths.push((upload_name(relative), path.clone()));
        }
    }
    paths.sort();
    debug!("Found {} files under {}", paths.len(), dir.display());

    paths
        .into_iter()
        .map(|(name, path)| read(&path).map(|bytes| UploadFile::new(name, bytes)))
        .collect()
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Relative path with `/` separators on every platform
fn upload_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn read(path: &Path) -> Result<Vec<u8>, UploadCollectError> {
    std::fs::read(path).map_err(|source| UploadCollectError::Read {
        path: path.to_path_buf(),
        source,
    })
}
