//! The lossless JSON package.
//!
//! ```json
//! { "format": "schematic-package", "version": 1, "name": "Orders",
//!   "nodes": [ { "id": "t1", "kind": "task", "task": "user", "label": "Review",
//!                "position": { "x": 10.0, "y": 20.0 } } ],
//!   "edges": [ { "id": "e1", "source": "s", "target": "t1", "kind": "sequence-flow" } ] }
//! ```
//!
//! Every graph field is written. Fields the package layout does not name are
//! kept as extensions on the package, node or edge that carried them and are
//! written back in their original order.

mod export;
mod import;
mod record;

use schematic_core::Graph;

use crate::{
    Imported,
    error::{ExportError, MalformedInputError},
};

const FORMAT: &str = "JSON package";

/// Import a JSON package.
///
/// # Errors
///
/// Returns [`MalformedInputError`] for invalid JSON, missing or ill-typed
/// fields, unknown kind keywords, duplicate ids, and edges whose endpoints
/// are not nodes of the package.
pub fn import(text: &str) -> Result<Imported, MalformedInputError> {
    import::import(text)
}

/// Export a graph as a JSON package, indented when `pretty` is set.
///
/// # Errors
///
/// Returns [`ExportError::Write`] if serialization fails; every graph can be
/// represented.
pub fn export(graph: &Graph, pretty: bool) -> Result<String, ExportError> {
    export::export(graph, pretty)
}
