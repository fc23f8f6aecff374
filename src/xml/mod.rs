//! The declarative XML mapping layer.
//!
//! Four pieces cooperate here:
//!
//! - [`cursor`] — a pull-style cursor over a tokenized document, the
//!   reading substrate (depth, names, namespaces, attributes, raw markup
//!   extraction).
//! - [`schema`] — per-type rule tables ([`schema::ElementSpec`] /
//!   [`schema::AttributeSpec`]) bound via the [`schema::Schema`] trait:
//!   immutable static metadata describing how fields map to markup.
//! - [`parse`] — the engine that walks a cursor and dispatches nodes to a
//!   type's rules, with depth-based termination.
//! - [`write`] — the mirror engine that walks the same rules in declaration
//!   order to emit documents.

pub mod cursor;
pub mod parse;
pub mod schema;
pub mod write;
