use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, UserDirs};
use thiserror::Error;

pub mod config_store;
pub mod session_log;

pub use config_store::ConfigStore;

/// Application folder created under the user's Documents directory.
pub const APP_FOLDER: &str = "AutoOmega Bot";
pub const CONFIG_FOLDER: &str = "Config";
pub const LOGS_FOLDER: &str = "Logs";
pub const OUTPUT_FOLDER: &str = "Output";
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the application folder.
pub const HOME_ENV: &str = "OMEGABOT_HOME";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("configuration at {0} is not a JSON object")]
    NotAnObject(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The user's Documents folder, whatever the platform calls it.
///
/// Falls back to `$HOME/Documents` when the platform reports none.
pub fn documents_folder() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(Path::to_path_buf))
        .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().join("Documents")))
        .unwrap_or_else(|| PathBuf::from("Documents"))
}

/// Fixed folder layout: `<base>/Config`, `<base>/Logs`, `<base>/Output`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppDirs {
    base: PathBuf,
}

impl AppDirs {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve the application folder: explicit override, then `OMEGABOT_HOME`,
    /// then `<Documents>/AutoOmega Bot`.
    pub fn detect(explicit: Option<PathBuf>) -> Self {
        let base = explicit
            .or_else(|| {
                std::env::var_os(HOME_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| documents_folder().join(APP_FOLDER));
        Self::new(base)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn config_dir(&self) -> PathBuf {
        self.base.join(CONFIG_FOLDER)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join(LOGS_FOLDER)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base.join(OUTPUT_FOLDER)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    /// Create all three subfolders. Safe to call repeatedly.
    pub fn ensure(&self) -> StoreResult<()> {
        for dir in [self.config_dir(), self.logs_dir(), self.output_dir()] {
            fs::create_dir_all(&dir).map_err(|err| StoreError::io(&dir, err))?;
        }
        Ok(())
    }
}
