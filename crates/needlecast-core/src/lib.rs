//! Data model for the needlecast indexing core.
//!
//! This crate defines the vocabulary shared between the external static
//! analyzer, the needle generators, and the search-index sink:
//! - Byte spans and line maps for locating facts in files
//! - Typed per-file analysis facts (declarations, references, warnings)
//! - The whole-program call graph and inheritance map
//! - Error types for per-file indexing failures
//!
//! Everything here is derived, immutable data: the analyzer produces one
//! [`facts::FactStore`] per translation unit plus program-wide call and
//! inheritance inputs, and the engine crate reads them without mutation.

pub mod error;
pub mod facts;
pub mod span;
pub mod text;
