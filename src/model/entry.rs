use std::io;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};

use crate::error::Error;
use crate::model::category::Category;
use crate::model::content::Content;
use crate::model::link::{Link, Links};
use crate::model::person::Person;
use crate::model::source::Source;
use crate::xml::cursor::Cursor;
use crate::xml::parse::{from_element, read_timestamp};
use crate::xml::schema::{AttributeSpec, ElementSpec, Extensions, Schema};
use crate::xml::write::{to_document, to_document_with, WriteOptions};
use crate::ATOM_NS;

/// A single entry, either inside a feed or as a standalone entry document
/// (the form the publishing protocol exchanges).
///
/// Build one directly with struct-update syntax for publishing:
///
/// ```
/// use plumage::{Content, Entry};
///
/// let entry = Entry {
///     title: Some(Content::from_text("My first post")),
///     id: Some("urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a".to_string()),
///     ..Default::default()
/// };
/// assert!(entry.to_xml().unwrap().contains("My first post"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub id: Option<String>,
    pub title: Option<Content>,
    pub summary: Option<Content>,
    pub content: Option<Content>,
    pub rights: Option<String>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub published: Option<DateTime<FixedOffset>>,
    pub source: Option<Source>,
    pub links: Links,
    pub authors: Vec<Person>,
    pub contributors: Vec<Person>,
    pub categories: Vec<Category>,
    pub extensions: Extensions,
}

impl Entry {
    /// Parses a standalone entry document.
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        crate::loader::from_xml_str(xml)
    }

    /// Parses a standalone entry document from a byte stream.
    pub fn from_reader(input: impl io::Read) -> Result<Self, Error> {
        crate::loader::from_reader(input)
    }

    /// Constructs an entry from a cursor positioned at (or just before) an
    /// `entry` element.
    pub fn from_cursor(xml: &mut Cursor<'_>) -> Result<Self, Error> {
        crate::xml::parse::from_cursor(xml)
    }

    /// Serializes this entry as a standalone document.
    pub fn to_xml(&self) -> Result<String, Error> {
        to_document(self)
    }

    /// Serializes with explicit namespace-prefix options.
    pub fn to_xml_with(&self, options: &WriteOptions) -> Result<String, Error> {
        to_document_with(self, options)
    }

    /// The entry's first alternate link.
    pub fn alternate(&self) -> Option<&Link> {
        self.links.alternate()
    }
}

impl FromStr for Entry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entry::from_xml(s)
    }
}

impl Schema for Entry {
    const ROOT_NAME: &'static str = "entry";
    const NAMESPACE: &'static str = ATOM_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        static SPECS: &[ElementSpec<Entry>] = &[
            ElementSpec {
                name: "id",
                ns: None,
                build: |entry, xml| {
                    entry.id = Some(xml.read_string());
                    Ok(())
                },
                emit: |entry, spec, out| out.text(spec, entry.id.as_deref()),
            },
            ElementSpec {
                name: "title",
                ns: None,
                build: |entry, xml| {
                    entry.title = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |entry, spec, out| match &entry.title {
                    Some(title) => title.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "summary",
                ns: None,
                build: |entry, xml| {
                    entry.summary = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |entry, spec, out| match &entry.summary {
                    Some(summary) => summary.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "content",
                ns: None,
                build: |entry, xml| {
                    entry.content = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |entry, spec, out| match &entry.content {
                    Some(content) => content.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "rights",
                ns: None,
                build: |entry, xml| {
                    entry.rights = Some(xml.read_string());
                    Ok(())
                },
                emit: |entry, spec, out| out.text(spec, entry.rights.as_deref()),
            },
            ElementSpec {
                name: "updated",
                ns: None,
                build: |entry, xml| {
                    entry.updated = read_timestamp(xml, "updated");
                    Ok(())
                },
                emit: |entry, spec, out| out.date(spec, entry.updated.as_ref()),
            },
            ElementSpec {
                name: "published",
                ns: None,
                build: |entry, xml| {
                    entry.published = read_timestamp(xml, "published");
                    Ok(())
                },
                emit: |entry, spec, out| out.date(spec, entry.published.as_ref()),
            },
            ElementSpec {
                name: "source",
                ns: None,
                build: |entry, xml| {
                    entry.source = Some(from_element::<Source>(xml)?);
                    Ok(())
                },
                emit: |entry, spec, out| out.entity(spec, entry.source.as_ref()),
            },
            ElementSpec {
                name: "link",
                ns: None,
                build: |entry, xml| {
                    entry.links.push(from_element::<Link>(xml)?);
                    Ok(())
                },
                emit: |entry, spec, out| out.entity_list(spec, entry.links.iter()),
            },
            ElementSpec {
                name: "author",
                ns: None,
                build: |entry, xml| {
                    entry.authors.push(from_element::<Person>(xml)?);
                    Ok(())
                },
                emit: |entry, spec, out| out.entity_list(spec, entry.authors.iter()),
            },
            ElementSpec {
                name: "contributor",
                ns: None,
                build: |entry, xml| {
                    entry.contributors.push(from_element::<Person>(xml)?);
                    Ok(())
                },
                emit: |entry, spec, out| out.entity_list(spec, entry.contributors.iter()),
            },
            ElementSpec {
                name: "category",
                ns: None,
                build: |entry, xml| {
                    entry.categories.push(from_element::<Category>(xml)?);
                    Ok(())
                },
                emit: |entry, spec, out| out.entity_list(spec, entry.categories.iter()),
            },
        ];
        SPECS
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        &[]
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn extensions_mut(&mut self) -> Option<&mut Extensions> {
        Some(&mut self.extensions)
    }
}
