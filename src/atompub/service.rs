use std::io;
use std::str::FromStr;

use reqwest::blocking::Client;

use crate::error::Error;
use crate::model::{Category, Content};
use crate::xml::cursor::Cursor;
use crate::xml::parse::from_element;
use crate::xml::schema::{AttributeSpec, ElementSpec, Schema};
use crate::xml::write::{to_document, to_document_with, WriteOptions};
use crate::{APP_NS, ATOM_NS};

/// An AtomPub service document: the `app:service` root listing the
/// workspaces a server offers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Service {
    pub workspaces: Vec<Workspace>,
}

impl Service {
    /// Parses a service document from text.
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        crate::loader::from_xml_str(xml)
    }

    /// Parses a service document from a byte stream.
    pub fn from_reader(input: impl io::Read) -> Result<Self, Error> {
        crate::loader::from_reader(input)
    }

    /// Fetches and parses a service document over HTTP(S).
    pub fn fetch(client: &Client, url: &str) -> Result<Self, Error> {
        crate::loader::fetch(client, url)
    }

    /// Constructs a service document from a cursor positioned at (or just
    /// before) an `app:service` element.
    pub fn from_cursor(xml: &mut Cursor<'_>) -> Result<Self, Error> {
        crate::xml::parse::from_cursor(xml)
    }

    /// Serializes this service document.
    pub fn to_xml(&self) -> Result<String, Error> {
        to_document(self)
    }

    pub fn to_xml_with(&self, options: &WriteOptions) -> Result<String, Error> {
        to_document_with(self, options)
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::from_xml(s)
    }
}

impl Schema for Service {
    const ROOT_NAME: &'static str = "service";
    const NAMESPACE: &'static str = APP_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        static SPECS: &[ElementSpec<Service>] = &[ElementSpec {
            name: "workspace",
            ns: None,
            build: |service, xml| {
                service.workspaces.push(from_element::<Workspace>(xml)?);
                Ok(())
            },
            emit: |service, spec, out| out.entity_list(spec, service.workspaces.iter()),
        }];
        SPECS
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        &[]
    }
}

/// One workspace: a titled group of collections.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Workspace {
    pub title: Option<Content>,
    pub collections: Vec<Collection>,
}

impl Workspace {
    /// Constructs a workspace from a cursor positioned at (or just before)
    /// an `app:workspace` element.
    pub fn from_cursor(xml: &mut Cursor<'_>) -> Result<Self, Error> {
        crate::xml::parse::from_cursor(xml)
    }
}

impl Schema for Workspace {
    const ROOT_NAME: &'static str = "workspace";
    const NAMESPACE: &'static str = APP_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        static SPECS: &[ElementSpec<Workspace>] = &[
            ElementSpec {
                name: "title",
                ns: Some(ATOM_NS),
                build: |workspace, xml| {
                    workspace.title = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |workspace, spec, out| match &workspace.title {
                    Some(title) => title.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "collection",
                ns: None,
                build: |workspace, xml| {
                    workspace.collections.push(from_element::<Collection>(xml)?);
                    Ok(())
                },
                emit: |workspace, spec, out| out.entity_list(spec, workspace.collections.iter()),
            },
        ];
        SPECS
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        &[]
    }
}

/// One collection: an endpoint entries can be published to.
///
/// `accepts` lists the media types the server takes; an empty list means
/// the AtomPub default (entry documents only).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collection {
    pub href: Option<String>,
    pub title: Option<Content>,
    pub categories: Option<Categories>,
    pub accepts: Vec<String>,
}

impl Collection {
    /// Constructs a collection from a cursor positioned at (or just
    /// before) an `app:collection` element.
    pub fn from_cursor(xml: &mut Cursor<'_>) -> Result<Self, Error> {
        crate::xml::parse::from_cursor(xml)
    }
}

impl Schema for Collection {
    const ROOT_NAME: &'static str = "collection";
    const NAMESPACE: &'static str = APP_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        static SPECS: &[ElementSpec<Collection>] = &[
            ElementSpec {
                name: "title",
                ns: Some(ATOM_NS),
                build: |collection, xml| {
                    collection.title = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |collection, spec, out| match &collection.title {
                    Some(title) => title.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "categories",
                ns: None,
                build: |collection, xml| {
                    collection.categories = Some(from_element::<Categories>(xml)?);
                    Ok(())
                },
                emit: |collection, spec, out| out.entity(spec, collection.categories.as_ref()),
            },
            ElementSpec {
                // content-only: each accept element is plain text
                name: "accept",
                ns: None,
                build: |collection, xml| {
                    collection.accepts.push(xml.read_string());
                    Ok(())
                },
                emit: |collection, spec, out| out.text_list(spec, &collection.accepts),
            },
        ];
        SPECS
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        static SPECS: &[AttributeSpec<Collection>] = &[AttributeSpec {
            name: "href",
            set: |collection, value| collection.href = Some(value.to_string()),
            get: |collection| collection.href.clone(),
        }];
        SPECS
    }
}

/// The `app:categories` element of a collection: either inline `category`
/// children (optionally `fixed`), or an out-of-line document referenced by
/// `href`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Categories {
    pub href: Option<String>,
    pub fixed: Option<String>,
    pub scheme: Option<String>,
    pub categories: Vec<Category>,
}

impl Schema for Categories {
    const ROOT_NAME: &'static str = "categories";
    const NAMESPACE: &'static str = APP_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        static SPECS: &[ElementSpec<Categories>] = &[ElementSpec {
            name: "category",
            ns: Some(ATOM_NS),
            build: |categories, xml| {
                categories.categories.push(from_element::<Category>(xml)?);
                Ok(())
            },
            emit: |categories, spec, out| out.entity_list(spec, categories.categories.iter()),
        }];
        SPECS
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        static SPECS: &[AttributeSpec<Categories>] = &[
            AttributeSpec {
                name: "href",
                set: |categories, value| categories.href = Some(value.to_string()),
                get: |categories| categories.href.clone(),
            },
            AttributeSpec {
                name: "fixed",
                set: |categories, value| categories.fixed = Some(value.to_string()),
                get: |categories| categories.fixed.clone(),
            },
            AttributeSpec {
                name: "scheme",
                set: |categories, value| categories.scheme = Some(value.to_string()),
                get: |categories| categories.scheme.clone(),
            },
        ];
        SPECS
    }
}
