//! The Atom data model.
//!
//! Plain structs with public fields — build them directly (struct-update
//! syntax with `..Default::default()`) or parse them from documents. Each
//! type's XML shape is declared in its [`Schema`](crate::xml::schema::Schema)
//! implementation: an ordered rule table that drives both parsing and
//! serialization, so the two directions can never drift apart.

mod category;
mod content;
mod entry;
mod feed;
mod generator;
mod link;
mod person;
mod source;

pub use category::Category;
pub use content::{Body, Content};
pub use entry::Entry;
pub use feed::{EntryWalk, Feed};
pub use generator::Generator;
pub use link::{Link, Links};
pub use person::Person;
pub use source::Source;
