//! Lorebook engine - storage, profile registry, and import/export codec.
//!
//! Everything here is synchronous: each storage read, normalization,
//! write, or merge completes before control returns to the caller. The
//! domain crate holds the pure data model; this crate wires it to a
//! key-value namespace and to the document formats.

pub mod codec;
pub mod diagnostics;
pub mod registry;
pub mod stores;

pub use codec::{
    apply_pack, export_full, export_pack, export_profile, import_full, import_profile,
    parse_document, slugify, CodecError, Document, ExportDocument, GmPack, PackOutcome,
    PackTarget,
};
pub use diagnostics::diagnostic_summary;
pub use registry::{ListenerId, ProfileRegistry, RegistryError};
pub use stores::{keys, FileStore, KeyValueStore, MemoryStore, Storage, StoreError};
