//! The configuration document entity.
//!
//! A [`ConfigDocument`] owns one backing file and the in-memory view of its
//! content.  The view is always in exactly one of three states:
//!
//! ```text
//!            encode(e)                 delete()
//!  Decoded ─────────────▶ Encoded ───────────────┐
//!     ▲  │◀──────────────   │                     ▼
//!     │  │    decode()      └──────────────────▶ Deleted
//!     │  └─────────────────────────────────────▶   (terminal)
//!     │                       delete()
//!  update_content / merge_content / reload
//! ```
//!
//! Only a decoded document can be mutated.  Every mutation is serialized and
//! written to disk *before* the in-memory content changes, so the backing
//! file always reflects the latest decoded content after a successful call,
//! and a failed call leaves both memory and disk as they were.
//!
//! Encoding happens in memory only: [`ConfigDocument::encode`] never rewrites
//! the backing file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::encoding::{self, Encoding};
use crate::error::{ConfigError, Result};
use crate::format::ConfigFormat;
use crate::storage::{DocumentStore, FileStore};

/// In-memory representation of a document's content.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentState {
    /// Structured, format-parsed content.
    Decoded(Value),
    /// The serialized content after a binary-to-text transform.
    Encoded { blob: String, encoding: Encoding },
    /// The backing file has been removed; the document is unusable.
    Deleted,
}

impl DocumentState {
    fn label(&self) -> &'static str {
        match self {
            Self::Decoded(_) => "decoded",
            Self::Encoded { .. } => "encoded",
            Self::Deleted => "deleted",
        }
    }
}

/// A JSON or TOML configuration file together with its in-memory content.
///
/// # Examples
///
/// ```rust
/// use confdoc::{ConfigDocument, ConfigFormat, Encoding};
/// use serde_json::json;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("app.json");
///
/// let mut doc = ConfigDocument::create(&path, ConfigFormat::Json, json!({"a": 1})).unwrap();
/// doc.update_content(json!({"a": 2})).unwrap();
///
/// doc.encode(Encoding::Base64).unwrap();
/// assert!(doc.encoded_blob().is_some());
/// doc.decode().unwrap();
///
/// assert_eq!(doc.content().unwrap(), &json!({"a": 2}));
/// ```
pub struct ConfigDocument<S: DocumentStore = FileStore> {
    path: PathBuf,
    format: ConfigFormat,
    state: DocumentState,
    store: S,
}

impl<S: DocumentStore> fmt::Debug for ConfigDocument<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDocument")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ── Constructors backed by the local file system ──────────────────────────────

impl ConfigDocument<FileStore> {
    /// Creates a new document at `path` and writes `initial_content` to it.
    ///
    /// An existing file at `path` is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialization`] if `initial_content` cannot be
    /// represented in `format`, or [`ConfigError::Io`] if the file cannot be
    /// written.
    pub fn create(
        path: impl Into<PathBuf>,
        format: ConfigFormat,
        initial_content: Value,
    ) -> Result<Self> {
        Self::create_with_store(FileStore::new(), path, format, initial_content)
    }

    /// Loads and parses the existing file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if the file is absent and
    /// [`ConfigError::Parse`] if it is not valid `format` content.
    pub fn read(path: impl Into<PathBuf>, format: ConfigFormat) -> Result<Self> {
        Self::read_with_store(FileStore::new(), path, format)
    }

    /// Reads the file at `path`, creating it with an empty mapping if it
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read) and [`create`](Self::create), except that
    /// a missing file is not an error.
    pub fn open_or_create(path: impl Into<PathBuf>, format: ConfigFormat) -> Result<Self> {
        Self::open_or_create_with_store(FileStore::new(), path, format)
    }
}

// ── Generic operations ────────────────────────────────────────────────────────

impl<S: DocumentStore> ConfigDocument<S> {
    /// Like [`ConfigDocument::create`], persisting through `store`.
    ///
    /// # Errors
    ///
    /// See [`ConfigDocument::create`].
    pub fn create_with_store(
        store: S,
        path: impl Into<PathBuf>,
        format: ConfigFormat,
        initial_content: Value,
    ) -> Result<Self> {
        let path = path.into();
        let text = format.serialize(&initial_content)?;
        store
            .write(&path, text.as_bytes())
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), %format, "created config document");
        Ok(Self {
            path,
            format,
            state: DocumentState::Decoded(initial_content),
            store,
        })
    }

    /// Like [`ConfigDocument::read`], loading through `store`.
    ///
    /// # Errors
    ///
    /// See [`ConfigDocument::read`].
    pub fn read_with_store(
        store: S,
        path: impl Into<PathBuf>,
        format: ConfigFormat,
    ) -> Result<Self> {
        let path = path.into();
        let content = load(&store, &path, format)?;
        Ok(Self {
            path,
            format,
            state: DocumentState::Decoded(content),
            store,
        })
    }

    /// Like [`ConfigDocument::open_or_create`], going through `store`.
    ///
    /// # Errors
    ///
    /// See [`ConfigDocument::open_or_create`].
    pub fn open_or_create_with_store(
        store: S,
        path: impl Into<PathBuf>,
        format: ConfigFormat,
    ) -> Result<Self> {
        let path = path.into();
        match load(&store, &path, format) {
            Ok(content) => Ok(Self {
                path,
                format,
                state: DocumentState::Decoded(content),
                store,
            }),
            Err(ConfigError::FileNotFound { .. }) => {
                Self::create_with_store(store, path, format, Value::Object(Map::new()))
            }
            Err(e) => Err(e),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format the document is serialized in.
    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Current in-memory state.
    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    /// Encoding currently applied to the in-memory representation, `None`
    /// when the document is decoded (or deleted).
    pub fn encoding(&self) -> Option<Encoding> {
        match self.state {
            DocumentState::Encoded { encoding, .. } => Some(encoding),
            _ => None,
        }
    }

    /// The encoded text, if the document is encoded.
    pub fn encoded_blob(&self) -> Option<&str> {
        match &self.state {
            DocumentState::Encoded { blob, .. } => Some(blob),
            _ => None,
        }
    }

    /// Returns `true` once [`delete`](Self::delete) has succeeded.
    pub fn is_deleted(&self) -> bool {
        matches!(self.state, DocumentState::Deleted)
    }

    /// Borrows the decoded content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidState`] if the document is encoded or
    /// deleted.
    pub fn content(&self) -> Result<&Value> {
        self.require_decoded("read content")
    }

    /// Replaces the content and persists it.
    ///
    /// This is the only way to replace a document's content.  The new value
    /// is serialized first, then written atomically, and only then swapped
    /// into memory.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidState`] if the document is encoded or deleted.
    /// - [`ConfigError::Serialization`] if `new_content` cannot be represented
    ///   in the document's format.
    /// - [`ConfigError::Io`] if the write fails.  The backing file and the
    ///   in-memory content are unchanged.
    pub fn update_content(&mut self, new_content: Value) -> Result<()> {
        self.require_decoded("update content")?;
        self.add_content(new_content)
    }

    /// Shallow-merges `values` into the top-level mapping and persists the
    /// result.  Keys already present are overwritten.
    ///
    /// # Errors
    ///
    /// Same as [`update_content`](Self::update_content); additionally
    /// [`ConfigError::Serialization`] if the current content is not a mapping.
    pub fn merge_content(&mut self, values: Map<String, Value>) -> Result<()> {
        let current = self.require_decoded("merge content")?;
        let Value::Object(existing) = current else {
            return Err(ConfigError::Serialization {
                format: self.format,
                message: "cannot merge keys into content whose root is not a mapping".to_string(),
            });
        };
        let mut merged = existing.clone();
        merged.extend(values);
        self.add_content(Value::Object(merged))
    }

    /// Re-reads the backing file, discarding the in-memory content.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidState`] if the document is not decoded, otherwise
    /// the same errors as [`ConfigDocument::read`].
    pub fn reload(&mut self) -> Result<()> {
        self.require_decoded("reload")?;
        let content = load(&self.store, &self.path, self.format)?;
        self.state = DocumentState::Decoded(content);
        Ok(())
    }

    /// Removes the backing file.  The document cannot be used afterwards.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidState`] if already deleted, [`ConfigError::Io`]
    /// if the file cannot be removed.
    pub fn delete(&mut self) -> Result<()> {
        if self.is_deleted() {
            return Err(self.invalid_state("delete"));
        }
        self.store
            .remove(&self.path)
            .map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;
        self.state = DocumentState::Deleted;
        info!(path = %self.path.display(), "deleted config document");
        Ok(())
    }

    /// Serializes the content and replaces it in memory with its `encoding`
    /// text form.  The backing file is not touched.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidState`] unless the document is decoded;
    /// [`ConfigError::Serialization`] if the content cannot be serialized.
    pub fn encode(&mut self, encoding: Encoding) -> Result<()> {
        let text = self.format.serialize(self.require_decoded("encode")?)?;
        let blob = encoding::encode_bytes(encoding, text.as_bytes());
        debug!(
            path = %self.path.display(),
            %encoding,
            len = blob.len(),
            "encoded content in memory"
        );
        self.state = DocumentState::Encoded { blob, encoding };
        Ok(())
    }

    /// Reverses [`encode`](Self::encode), restoring structured content.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidState`] unless the document is encoded.
    /// - [`ConfigError::Encoding`] if the blob is not valid for its encoding.
    /// - [`ConfigError::Parse`] if the decoded text is not valid content.
    ///
    /// On error the blob and encoding are kept.
    pub fn decode(&mut self) -> Result<()> {
        let DocumentState::Encoded { blob, encoding } = &self.state else {
            return Err(self.invalid_state("decode"));
        };
        let bytes = encoding::decode_text(*encoding, blob)?;
        let content = self.format.parse_bytes(&bytes)?;
        debug!(path = %self.path.display(), encoding = %encoding, "decoded content in memory");
        self.state = DocumentState::Decoded(content);
        Ok(())
    }

    /// Serializes, persists and then installs `content`.
    ///
    /// Callers have already checked that the document is decoded.
    fn add_content(&mut self, content: Value) -> Result<()> {
        let text = self.format.serialize(&content)?;
        if let Err(source) = self.store.write(&self.path, text.as_bytes()) {
            warn!(
                path = %self.path.display(),
                error = %source,
                "failed to persist config document"
            );
            return Err(ConfigError::Io {
                path: self.path.clone(),
                source,
            });
        }
        debug!(path = %self.path.display(), bytes = text.len(), "persisted config document");
        self.state = DocumentState::Decoded(content);
        Ok(())
    }

    fn require_decoded(&self, operation: &'static str) -> Result<&Value> {
        match &self.state {
            DocumentState::Decoded(content) => Ok(content),
            _ => Err(self.invalid_state(operation)),
        }
    }

    fn invalid_state(&self, operation: &'static str) -> ConfigError {
        ConfigError::InvalidState {
            operation,
            state: self.state.label(),
        }
    }
}

fn load<S: DocumentStore>(store: &S, path: &Path, format: ConfigFormat) -> Result<Value> {
    let bytes = store
        .read(path)
        .map_err(|source| ConfigError::from_read(path, source))?;
    let content = format.parse_bytes(&bytes)?;
    debug!(path = %path.display(), %format, "loaded config document");
    Ok(content)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
