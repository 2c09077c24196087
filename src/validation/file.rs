use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::utils::format::human_size;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FileError {
    #[error("Debe seleccionar un archivo de links")]
    NotSelected,

    #[error("El archivo seleccionado no existe")]
    NotFound,

    #[error("Formato de archivo no válido. Use CSV o Excel")]
    UnsupportedFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Csv,
    Excel,
}

/// A links file that exists and has a supported extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    kind: InputKind,
}

impl SelectedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Check that a links file was chosen, exists and is CSV or Excel.
pub fn validate_file_path(path: Option<&Path>) -> Result<SelectedFile, FileError> {
    let path = match path {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => return Err(FileError::NotSelected),
    };
    if !path.exists() {
        return Err(FileError::NotFound);
    }
    let kind = match extension_of(path).as_deref() {
        Some("csv") => InputKind::Csv,
        Some("xlsx") | Some("xls") => InputKind::Excel,
        _ => return Err(FileError::UnsupportedFormat),
    };
    Ok(SelectedFile {
        path: path.to_path_buf(),
        kind,
    })
}

/// Metadata shown next to the selected file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: String,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Local>>,
    pub extension: String,
}

pub fn file_info(path: &Path) -> Option<FileInfo> {
    let meta = fs::metadata(path).ok()?;
    let size_bytes = meta.len();
    Some(FileInfo {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size: human_size(size_bytes),
        size_bytes,
        modified: meta.modified().ok().map(DateTime::<Local>::from),
        extension: extension_of(path)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default(),
    })
}
