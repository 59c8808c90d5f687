//! A directory of named configuration documents.
//!
//! Applications that keep several config files side by side (for example
//! `server.toml` and `users.json` under one directory) can open them by name
//! through a [`ConfigRegistry`] instead of assembling paths by hand.  The
//! registry is an ordinary value passed to whoever needs it; there is no
//! process-wide instance.
//!
//! The registry's own settings are read from TOML:
//!
//! ```toml
//! directory = "/etc/myapp"
//! default_format = "toml"
//! create_missing = true
//! ```
//!
//! Fields absent from the file fall back to their defaults
//! (`directory = "."`, `default_format = "json"`, `create_missing = true`).

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::document::ConfigDocument;
use crate::error::{ConfigError, Result};
use crate::format::ConfigFormat;
use crate::storage::{DocumentStore, FileStore};

// ── Settings ──────────────────────────────────────────────────────────────────

/// Settings controlling where and how a [`ConfigRegistry`] opens documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrySettings {
    /// Directory holding the documents.  Created on first open if missing.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Format used by [`ConfigRegistry::open_default`].
    #[serde(default = "default_format")]
    pub default_format: ConfigFormat,
    /// Whether opening a missing document creates it with an empty mapping.
    #[serde(default = "default_true")]
    pub create_missing: bool,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}
fn default_format() -> ConfigFormat {
    ConfigFormat::Json
}
fn default_true() -> bool {
    true
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            default_format: default_format(),
            create_missing: default_true(),
        }
    }
}

impl RegistrySettings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed or a field has
    /// the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            format: ConfigFormat::Toml,
            message: e.to_string(),
        })
    }

    /// Loads settings from the TOML file at `path`, returning the defaults if
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file system errors other than "not
    /// found", and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no registry settings file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Opens, locates and removes named documents within one directory.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    settings: RegistrySettings,
}

impl ConfigRegistry {
    /// Creates a registry from explicit settings.
    pub fn new(settings: RegistrySettings) -> Self {
        Self { settings }
    }

    /// Creates a registry rooted at `directory` with default settings otherwise.
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self::new(RegistrySettings {
            directory: directory.into(),
            ..RegistrySettings::default()
        })
    }

    /// The settings this registry was built with.
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Directory holding the documents.
    pub fn directory(&self) -> &Path {
        &self.settings.directory
    }

    /// Path of the document `name` in `format`: `<directory>/<name>.<ext>`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidName`] unless `name` is a single plain file name,
    /// so that no name can resolve outside the registry directory.
    pub fn path_for(&self, name: &str, format: ConfigFormat) -> Result<PathBuf> {
        check_name(name)?;
        Ok(self
            .settings
            .directory
            .join(format!("{name}.{}", format.extension())))
    }

    /// Returns `true` if the document file exists.  Invalid names are never
    /// contained.
    pub fn contains(&self, name: &str, format: ConfigFormat) -> bool {
        self.path_for(name, format)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Opens the document `name`, resolving `file_type` (`"json"`, `".toml"`,
    /// ...) to a format.
    ///
    /// The registry directory is created if it does not exist.  A missing
    /// document is created with an empty mapping when `create_missing` is
    /// set.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnsupportedFormat`] for an unknown `file_type`.
    /// - [`ConfigError::InvalidName`] if `name` is not a plain file name.
    /// - [`ConfigError::FileNotFound`] if the document is missing and
    ///   `create_missing` is off.
    /// - Any error from [`ConfigDocument::read`] or [`ConfigDocument::create`].
    pub fn open(&self, name: &str, file_type: &str) -> Result<ConfigDocument> {
        let format = ConfigFormat::from_file_type(file_type)?;
        self.open_format(name, format)
    }

    /// Opens the document `name` in the registry's default format.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_default(&self, name: &str) -> Result<ConfigDocument> {
        self.open_format(name, self.settings.default_format)
    }

    /// Removes the document file `name` in `format`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidName`] if `name` is not a plain file name,
    /// [`ConfigError::FileNotFound`] if there is no such document,
    /// [`ConfigError::Io`] for other removal failures.
    pub fn remove(&self, name: &str, format: ConfigFormat) -> Result<()> {
        let path = self.path_for(name, format)?;
        FileStore::new()
            .remove(&path)
            .map_err(|source| ConfigError::from_read(&path, source))?;
        debug!(path = %path.display(), "removed config document from registry");
        Ok(())
    }

    fn open_format(&self, name: &str, format: ConfigFormat) -> Result<ConfigDocument> {
        let path = self.path_for(name, format)?;
        let dir = &self.settings.directory;
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;

        if self.settings.create_missing {
            ConfigDocument::open_or_create(path, format)
        } else {
            ConfigDocument::read(path, format)
        }
    }
}

/// Accepts only names that are one normal path component with no separator
/// of either platform, e.g. `server` or `app.local`.
fn check_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
