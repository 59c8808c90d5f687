//! # confdoc
//!
//! JSON and TOML configuration documents with create/read/update/delete
//! operations, atomic on-disk persistence, and in-memory encoding of the
//! serialized content as base64, base32, base16 or hex.
//!
//! # Architecture overview (for beginners)
//!
//! A configuration file is modelled as a [`ConfigDocument`]: the path of the
//! backing file, its [`ConfigFormat`], and the content held in memory.  The
//! content is either *decoded* (a structured [`serde_json::Value`] tree you
//! can read and replace) or *encoded* (an opaque text blob produced by one of
//! the [`Encoding`]s).
//!
//! - **`format`** – Parsing and serialization for JSON and TOML.  Both formats
//!   share one value tree, so callers never deal with format-specific types.
//!
//! - **`encoding`** – Reversible binary-to-text transforms.  Encoding a
//!   document turns its serialized text into, for example, base64.  Decoding
//!   turns it back.
//!
//! - **`domain`** – The document state machine: which operation is allowed in
//!   which state, and the guarantee that content is persisted before it is
//!   visible in memory.
//!
//! - **`storage`** – The file system seam.  [`FileStore`] replaces files
//!   atomically (temporary file + rename).
//!
//! - **`registry`** – A directory of named documents, for applications that
//!   keep several config files side by side.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events but never installs a subscriber; that
//! is left to the application.

pub mod domain;
pub mod encoding;
pub mod error;
pub mod format;
pub mod registry;
pub mod storage;

pub use domain::document::{ConfigDocument, DocumentState};
pub use encoding::Encoding;
pub use error::{ConfigError, Result};
pub use format::ConfigFormat;
pub use registry::{ConfigRegistry, RegistrySettings};
pub use storage::{DocumentStore, FileStore};
