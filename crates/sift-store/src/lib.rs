//! # sift-store
//!
//! In-memory document store driver for compiled sift queries.
//!
//! [`MemoryStore`] implements [`sift_filter::QueryExecutor`] by interpreting
//! the lookup / unwind / match stages of a [`sift_filter::CompiledQuery`]
//! over JSON documents, with the matching semantics of a document database:
//! dotted paths fan out over arrays, missing fields compare as null, and
//! joins are left outer joins. It backs the record-level tests of the
//! compiler and the `sift query` command.

pub mod error;
pub mod eval;
pub mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;
