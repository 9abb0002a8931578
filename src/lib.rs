// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # appindex: application schema and route indexing
//!
//! Inspects a bootstrapped application's live object model and produces a
//! structured, serializable index for editor tooling (autocomplete,
//! go-to-definition, hover documentation):
//!
//! - **Schema**: every registered record type, its fields classified as
//!   scalar / forward relation / many relation / reverse relation, the
//!   synthesized `_id` shadow keys, resolved symbolic-choice types, and
//!   the per-field-kind lookup-operator taxonomy.
//! - **Routes**: the routing tree flattened into concrete endpoints, each
//!   resolved to the exact (file, line) of the routine that handles it,
//!   through decorator layers and multi-level dispatch.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use appindex::{schema_document, route_document, Snapshot};
//!
//! // A snapshot manifest is produced by whatever bootstraps the host app.
//! let snapshot = Snapshot::load(std::path::Path::new("snapshot.yaml"))?;
//!
//! let schema = schema_document(&snapshot);
//! let routes = route_document(&snapshot);
//!
//! println!("{}", serde_json::to_string_pretty(&schema)?);
//! println!("{}", serde_json::to_string_pretty(&routes)?);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! snapshot manifest (bootstrap output)
//!        │
//!        ├──► TypeRegistry ──► schema walker ──► SchemaDocument
//!        │                        └── lookup taxonomy (static)
//!        │
//!        └──► RouteTable ──► route resolver ──► Vec<Endpoint>
//!                               └── source locator (wrapper unwinding)
//! ```
//!
//! The walkers never touch a reflection mechanism: they depend only on the
//! [`TypeRegistry`] and [`RouteTable`] capability traits. [`Snapshot`] is
//! the shipped explicit-manifest implementation; a host embedding this
//! crate can implement the traits against any other introspection source.
//!
//! ## Failure model
//!
//! Per-item failures (an unclassifiable field, an unlocatable handler) are
//! absorbed: the item is omitted, siblings are unaffected. Only bootstrap
//! (manifest) and serialization failures escalate, as an
//! [`ErrorEnvelope`] on stderr and a nonzero exit.

// Core modules
pub mod error;
pub mod host;
pub mod locate;
pub mod lookups;
pub mod snapshot;

// Extraction
pub mod routes;
pub mod schema;

// Output assembly
pub mod report;

// Re-exports
pub use error::{Error, Result};
pub use host::{
    ActionBinding, Callable, ChoiceKind, ChoicePair, ChoiceTypeDef, ClassSource, Handler,
    RawField, RawRelation, RawReverse, RecordTypeDef, RelationKind, ReverseKind, RouteNode,
    RouteTable, SourceLocation, TypeRegistry, ViewClass, Wrapper,
};
pub use locate::{locate, unwrap_callable};
pub use lookups::{table as lookup_table, LookupDoc, LookupTable, BASE_LOOKUPS};
pub use report::{
    model_summaries, route_document, schema_document, ErrorEnvelope, ModelEntry, ModelSummary,
    SchemaDocument,
};
pub use routes::{resolve as resolve_routes, Endpoint, HTTP_METHODS};
pub use schema::{
    walk as walk_schema, ChoiceInfo, FieldDescriptor, FieldKind, FieldMetadata, RecordType,
};
pub use snapshot::{ModuleNamespace, Snapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
