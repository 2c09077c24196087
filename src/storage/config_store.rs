use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{AppDirs, StoreError, StoreResult, APP_FOLDER, CONFIG_FOLDER, LOGS_FOLDER, OUTPUT_FOLDER};
use crate::types::Configuration;

/// Loads and persists the user's [`Configuration`] as `Config/config.json`.
///
/// `load` and `save` never fail: problems are logged and turned into defaults
/// or a `false` return. The `try_*` variants expose the underlying error.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    dirs: AppDirs,
}

impl ConfigStore {
    pub fn new(dirs: AppDirs) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &AppDirs {
        &self.dirs
    }

    pub fn path(&self) -> PathBuf {
        self.dirs.config_file()
    }

    /// Read the stored configuration; `Ok(None)` when no file exists yet.
    ///
    /// Keys are taken one by one, so a single value of the wrong type only
    /// resets that key to its default.
    pub fn try_load(&self) -> StoreResult<Option<Configuration>> {
        let path = self.path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(path, err)),
        };
        let stored = match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => map,
            _ => return Err(StoreError::NotAnObject(path)),
        };

        let (config, rejected) = Configuration::from_stored(stored);
        if !rejected.is_empty() {
            warn!(
                target: "config",
                keys = %rejected.join(", "),
                "ignoring stored values of the wrong type; defaults used"
            );
        }
        Ok(Some(config))
    }

    /// Stored configuration with defaults for missing keys, or all defaults when
    /// the file is absent or unreadable.
    pub fn load(&self) -> Configuration {
        match self.try_load() {
            Ok(Some(config)) => {
                debug!(target: "config", path = %self.path().display(), "configuration loaded");
                config
            }
            Ok(None) => {
                debug!(target: "config", path = %self.path().display(), "no configuration file; using defaults");
                Configuration::default()
            }
            Err(err) => {
                warn!(target: "config", error = %err, "failed to load configuration; using defaults");
                Configuration::default()
            }
        }
    }

    /// Normalize and write the full configuration as indented JSON.
    pub fn try_save(&self, config: &mut Configuration) -> StoreResult<()> {
        if !config.output_path.trim().is_empty() {
            let normalized =
                normalize_output_path(Path::new(config.output_path.trim()), &self.dirs.output_dir());
            config.output_path = normalized.display().to_string();
        }
        config.normalize_funds();

        let dir = self.dirs.config_dir();
        fs::create_dir_all(&dir).map_err(|err| StoreError::io(&dir, err))?;

        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        config.serialize(&mut ser)?;

        let path = self.path();
        fs::write(&path, buf).map_err(|err| StoreError::io(&path, err))?;
        Ok(())
    }

    /// Persist `config`, returning whether it was written.
    pub fn save(&self, config: &mut Configuration) -> bool {
        match self.try_save(config) {
            Ok(()) => {
                info!(target: "config", path = %self.path().display(), "configuration saved");
                true
            }
            Err(err) => {
                warn!(target: "config", error = %err, "failed to save configuration");
                false
            }
        }
    }
}

fn try_normalize(path: &Path) -> io::Result<PathBuf> {
    let components: Vec<_> = path.components().collect();
    // The innermost app folder wins, so `.../AutoOmega Bot/Output` is kept as is.
    let app_index = components
        .iter()
        .rposition(|c| c.as_os_str() == APP_FOLDER);

    let output = match app_index {
        Some(index) => components[..=index]
            .iter()
            .collect::<PathBuf>()
            .join(OUTPUT_FOLDER),
        None => {
            let app_root = path.join(APP_FOLDER);
            fs::create_dir_all(app_root.join(CONFIG_FOLDER))?;
            fs::create_dir_all(app_root.join(LOGS_FOLDER))?;
            app_root.join(OUTPUT_FOLDER)
        }
    };
    fs::create_dir_all(&output)?;
    Ok(output)
}

/// Map a user-chosen output location onto its `AutoOmega Bot/Output` folder.
///
/// - `.../AutoOmega Bot/Output` is kept as is.
/// - `.../AutoOmega Bot` or anything below it resolves to `.../AutoOmega Bot/Output`.
/// - Any other folder gets a full `AutoOmega Bot/{Config,Logs,Output}` tree.
///
/// The returned folder exists. If it cannot be created, `fallback` is used.
pub fn normalize_output_path(path: &Path, fallback: &Path) -> PathBuf {
    match try_normalize(path) {
        Ok(output) => output,
        Err(err) => {
            warn!(
                target: "config",
                error = %err,
                path = %path.display(),
                "failed to prepare output folder; using default"
            );
            if let Err(err) = fs::create_dir_all(fallback) {
                warn!(target: "config", error = %err, "failed to create default output folder");
            }
            fallback.to_path_buf()
        }
    }
}
