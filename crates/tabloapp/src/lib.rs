//! # Tabloapp Architecture
//!
//! Tabloapp is a **typed property mapping layer** over a hosted
//! structured-database API: remote "pages" carry generically-typed JSON
//! "properties", and this crate maps them to and from plain Rust values.
//! The library is the product; the `tablo` binary is one thin client of it.
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Handles (database.rs, query.rs, page.rs, props.rs)        │
//! │  - Database identity + memoized schema                      │
//! │  - Lazy cursor-following page iteration                     │
//! │  - Typed reads, single-field write-back on set              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Codecs (codec.rs, value.rs, text.rs, name.rs)              │
//! │  - Static per-tag registry of decode/encode strategies      │
//! │  - PropertyValue as the typed value domain                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backend (backend/)                                         │
//! │  - Abstract ApiBackend trait                                │
//! │  - HttpBackend (production), MemBackend (testing)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: One Blocking Round Trip at a Time
//!
//! Everything is single-threaded and synchronous. A schema is fetched at
//! most once per [`Database`], a query holds at most one batch of records
//! in memory, and a property write is exactly one update request. Nothing
//! is retried; failures surface as [`TabloError`] with the attempted
//! request attached.
//!
//! ## Module Overview
//!
//! - [`database`]: The database handle, entry point for all operations
//! - [`query`]: Lazy paginated iteration over query results
//! - [`page`]: Page records and their audit metadata
//! - [`props`]: Typed property instances and the per-page collection
//! - [`codec`]: The property type registry
//! - [`value`]: The typed value domain
//! - [`filter`]: Composable query predicates
//! - [`schema`]: Declared fields and name normalization targets
//! - [`name`]: The normalization itself
//! - [`backend`]: Transport boundary and implementations
//! - [`error`]: Error types

pub mod backend;
pub mod codec;
pub mod database;
pub mod error;
pub mod filter;
pub mod name;
pub mod page;
pub mod props;
pub mod query;
pub mod schema;
mod text;
pub mod value;

pub use database::Database;
pub use error::{Result, TabloError};
pub use filter::Filter;
pub use page::Page;
pub use value::PropertyValue;
