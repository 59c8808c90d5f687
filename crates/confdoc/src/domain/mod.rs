//! Domain entities for configuration documents.
//!
//! This module holds the document state machine.  It depends on the format
//! and encoding modules for pure transforms and reaches the file system only
//! through the [`DocumentStore`](crate::storage::DocumentStore) seam, so
//! every rule here can be unit-tested against a mock store.

/// The configuration document entity.
///
/// See [`document::ConfigDocument`] for the main type.
pub mod document;
