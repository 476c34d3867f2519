//! Needle generation and line folding for the needlecast indexing core.
//!
//! This crate turns one file's analysis facts (plus the whole-program call
//! graph and inheritance map) into typed, span-located search facts
//! ("needles"), then folds them into per-line records the search-index sink
//! bulk-loads. The per-file entry point is [`pipeline::index_file`].
//!
//! The core is a pure, stateless batch transform: no I/O, no shared mutable
//! state. Files may be processed concurrently, one file per worker, against
//! the same immutable call graph and inheritance map snapshots.

pub mod fold;
pub mod needles;
pub mod pipeline;
