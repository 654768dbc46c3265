//! # CCG Graph
//!
//! Code Context Graph: modules, classes and functions joined by symmetric
//! containment, inheritance, call and import edges.
//!
//! ## Architecture
//!
//! ```text
//! StructuralRecord[] (fixed order)
//!     │
//!     ├──> GraphBuilder::ingest
//!     │      ├─ Pass 1: one module node per usable record
//!     │      ├─ Pass 2: classes (inheritance resolved point-in-time),
//!     │      │          methods, top-level functions
//!     │      └─ Pass 3: no cross-file call/import resolution
//!     │
//!     ├──> CodeGraph (append-only, petgraph arena)
//!     │      ├─ NameResolver: linear, first match in creation order
//!     │      └─ Queries: relationships, callers, callees, subclasses
//!     │
//!     └──> GraphSnapshot (nested mapping for persistence)
//! ```
//!
//! Call and import edges are never inferred; they only appear through
//! [`GraphBuilder::add_call_relationship`] and
//! [`GraphBuilder::add_import_relationship`].

mod builder;
mod error;
mod graph;
mod resolver;
mod snapshot;
mod types;

pub use builder::{GraphBuilder, IngestReport};
pub use error::{GraphError, Result};
pub use resolver::NameResolver;
pub use snapshot::{GraphSnapshot, NodeSnapshot};
pub use types::{
    CodeGraph, EdgeKind, LineSpan, Node, NodeId, NodeKind, NodeProperties,
    ParentKind, MAX_EXTRA_PROPERTIES, RESERVED_PROPERTY_KEYS,
};
