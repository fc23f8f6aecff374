//! Atom syndication and publishing with a declarative XML mapping layer.
//!
//! This crate reads and writes Atom feeds, entries and AtomPub service
//! documents with two-way fidelity: parse a document, edit the model,
//! serialize it back, and the declared fields survive the trip.
//!
//! # Architecture
//!
//! - [`xml`] — the mapping core: a pull-style [`xml::cursor::Cursor`], the
//!   per-type rule tables of [`xml::schema`], the depth-tracking parse
//!   engine in [`xml::parse`], and the mirror serializer in [`xml::write`].
//! - [`model`] — the Atom entities ([`Feed`], [`Entry`], [`Source`],
//!   [`Person`], [`Generator`], [`Link`]/[`Links`], [`Content`],
//!   [`Category`]), each declaring its own rule table.
//! - [`atompub`] — AtomPub service documents ([`Service`], [`Workspace`],
//!   [`Collection`], [`Categories`]) and the blocking publish/update/delete
//!   client.
//! - [`loader`] — input normalization: strings, byte streams, HTTP(S) URLs.
//!
//! # Example
//!
//! ```
//! use plumage::Feed;
//!
//! let feed = Feed::from_xml(r#"<?xml version="1.0" encoding="utf-8"?>
//! <feed xmlns="http://www.w3.org/2005/Atom">
//!   <title>Example Feed</title>
//!   <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
//!   <updated>2003-12-13T18:30:02Z</updated>
//!   <entry>
//!     <title>Atom-Powered Robots Run Amok</title>
//!     <link href="http://example.org/2003/12/13/atom03"/>
//!     <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
//!   </entry>
//! </feed>"#).unwrap();
//!
//! assert_eq!(feed.title.as_ref().unwrap(), "Example Feed");
//! assert_eq!(feed.entries.len(), 1);
//! assert_eq!(
//!     feed.entries[0].alternate().unwrap().href.as_deref(),
//!     Some("http://example.org/2003/12/13/atom03"),
//! );
//!
//! let roundtripped = Feed::from_xml(&feed.to_xml().unwrap()).unwrap();
//! assert_eq!(roundtripped, feed);
//! ```

pub mod atompub;
pub mod error;
pub mod loader;
pub mod model;
pub mod util;
pub mod xml;

pub use atompub::{Categories, Collection, Service, Workspace};
pub use error::Error;
pub use model::{
    Body, Category, Content, Entry, EntryWalk, Feed, Generator, Link, Links, Person, Source,
};
pub use xml::schema::{AttributeSpec, ElementSpec, Extensions, Schema};
pub use xml::write::WriteOptions;

/// The Atom namespace (RFC 4287).
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// The Atom Publishing Protocol namespace (RFC 5023).
pub const APP_NS: &str = "http://www.w3.org/2007/app";

/// The XHTML namespace, used by inline `type="xhtml"` content.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
