use std::io;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use reqwest::blocking::Client;

use crate::error::Error;
use crate::model::category::Category;
use crate::model::content::Content;
use crate::model::entry::Entry;
use crate::model::generator::Generator;
use crate::model::link::{Link, Links};
use crate::model::person::Person;
use crate::xml::cursor::Cursor;
use crate::xml::parse::{from_element, read_timestamp};
use crate::xml::schema::{AttributeSpec, ElementSpec, Extensions, Schema};
use crate::xml::write::{to_document, to_document_with, WriteOptions};
use crate::ATOM_NS;

/// Options for [`Feed::each_entry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryWalk {
    /// Follow `next` pagination links across feed pages.
    pub paginate: bool,
    /// Visit only entries updated strictly after this cutoff; the walk
    /// stops at the first entry at or before it (feeds are ordered
    /// newest-first).
    pub since: Option<DateTime<FixedOffset>>,
}

/// The top-level Atom feed document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feed {
    pub id: Option<String>,
    pub title: Option<Content>,
    pub subtitle: Option<Content>,
    pub rights: Option<String>,
    pub icon: Option<String>,
    pub logo: Option<String>,
    pub generator: Option<Generator>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub published: Option<DateTime<FixedOffset>>,
    pub links: Links,
    pub authors: Vec<Person>,
    pub contributors: Vec<Person>,
    pub categories: Vec<Category>,
    pub entries: Vec<Entry>,
    pub extensions: Extensions,
}

impl Feed {
    /// Parses a feed document from text.
    ///
    /// ```
    /// use plumage::Feed;
    ///
    /// let feed = Feed::from_xml(r#"<?xml version="1.0"?>
    /// <feed xmlns="http://www.w3.org/2005/Atom">
    ///   <title>Example Feed</title>
    ///   <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
    /// </feed>"#).unwrap();
    /// assert_eq!(feed.title.as_ref().unwrap(), "Example Feed");
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        crate::loader::from_xml_str(xml)
    }

    /// Parses a feed document from a byte stream.
    pub fn from_reader(input: impl io::Read) -> Result<Self, Error> {
        crate::loader::from_reader(input)
    }

    /// Fetches and parses a feed over HTTP(S).
    pub fn fetch(client: &Client, url: &str) -> Result<Self, Error> {
        crate::loader::fetch(client, url)
    }

    /// Constructs a feed from a cursor positioned at (or just before) a
    /// `feed` element.
    pub fn from_cursor(xml: &mut Cursor<'_>) -> Result<Self, Error> {
        crate::xml::parse::from_cursor(xml)
    }

    /// Serializes this feed as a standalone document.
    pub fn to_xml(&self) -> Result<String, Error> {
        to_document(self)
    }

    /// Serializes with explicit namespace-prefix options.
    pub fn to_xml_with(&self, options: &WriteOptions) -> Result<String, Error> {
        to_document_with(self, options)
    }

    /// The feed's first alternate link.
    pub fn alternate(&self) -> Option<&Link> {
        self.links.alternate()
    }

    /// True when this page is the first page of a paginated feed: the
    /// self link and the `first` pagination link point at the same target.
    /// An unpaginated feed is trivially its own first page.
    pub fn is_first_page(&self) -> bool {
        href_of(self.links.self_link()) == href_of(self.links.first_page())
    }

    /// Symmetric with [`is_first_page`](Feed::is_first_page) for the `last`
    /// pagination link.
    pub fn is_last_page(&self) -> bool {
        href_of(self.links.self_link()) == href_of(self.links.last_page())
    }

    /// Fetches the next page of a paginated feed; `Ok(None)` when there is
    /// no `next` link.
    pub fn next_page(&self, client: &Client) -> Result<Option<Feed>, Error> {
        fetch_page(client, self.links.next_page())
    }

    /// Fetches the previous page of a paginated feed; `Ok(None)` when there
    /// is no `prev` link.
    pub fn prev_page(&self, client: &Client) -> Result<Option<Feed>, Error> {
        fetch_page(client, self.links.prev_page())
    }

    /// Visits entries in document order, optionally following `next`
    /// pagination links and stopping at a `since` cutoff.
    ///
    /// # Errors
    ///
    /// Fails only when following a pagination link fails; entries already
    /// visited stay visited.
    pub fn each_entry<F>(&self, client: &Client, walk: &EntryWalk, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(&Entry),
    {
        let mut current: Option<Feed> = None;
        loop {
            let page = current.as_ref().unwrap_or(self);
            for entry in &page.entries {
                if let Some(cutoff) = walk.since {
                    match entry.updated {
                        Some(updated) if updated > cutoff => {}
                        _ => return Ok(()),
                    }
                }
                visit(entry);
            }
            if !walk.paginate {
                return Ok(());
            }
            match page.next_page(client)? {
                Some(next) => current = Some(next),
                None => return Ok(()),
            }
        }
    }
}

fn href_of(link: Option<&Link>) -> Option<&str> {
    link.and_then(|l| l.href.as_deref())
}

fn fetch_page(client: &Client, link: Option<&Link>) -> Result<Option<Feed>, Error> {
    match link.and_then(|l| l.href.as_deref()) {
        Some(href) => Feed::fetch(client, href).map(Some),
        None => Ok(None),
    }
}

impl FromStr for Feed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feed::from_xml(s)
    }
}

impl Schema for Feed {
    const ROOT_NAME: &'static str = "feed";
    const NAMESPACE: &'static str = ATOM_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        static SPECS: &[ElementSpec<Feed>] = &[
            ElementSpec {
                name: "id",
                ns: None,
                build: |feed, xml| {
                    feed.id = Some(xml.read_string());
                    Ok(())
                },
                emit: |feed, spec, out| out.text(spec, feed.id.as_deref()),
            },
            ElementSpec {
                name: "title",
                ns: None,
                build: |feed, xml| {
                    feed.title = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |feed, spec, out| match &feed.title {
                    Some(title) => title.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "subtitle",
                ns: None,
                build: |feed, xml| {
                    feed.subtitle = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |feed, spec, out| match &feed.subtitle {
                    Some(subtitle) => subtitle.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "rights",
                ns: None,
                build: |feed, xml| {
                    feed.rights = Some(xml.read_string());
                    Ok(())
                },
                emit: |feed, spec, out| out.text(spec, feed.rights.as_deref()),
            },
            ElementSpec {
                name: "icon",
                ns: None,
                build: |feed, xml| {
                    feed.icon = Some(xml.read_string());
                    Ok(())
                },
                emit: |feed, spec, out| out.text(spec, feed.icon.as_deref()),
            },
            ElementSpec {
                name: "logo",
                ns: None,
                build: |feed, xml| {
                    feed.logo = Some(xml.read_string());
                    Ok(())
                },
                emit: |feed, spec, out| out.text(spec, feed.logo.as_deref()),
            },
            ElementSpec {
                name: "generator",
                ns: None,
                build: |feed, xml| {
                    feed.generator = Some(from_element::<Generator>(xml)?);
                    Ok(())
                },
                emit: |feed, spec, out| out.entity(spec, feed.generator.as_ref()),
            },
            ElementSpec {
                name: "updated",
                ns: None,
                build: |feed, xml| {
                    feed.updated = read_timestamp(xml, "updated");
                    Ok(())
                },
                emit: |feed, spec, out| out.date(spec, feed.updated.as_ref()),
            },
            ElementSpec {
                name: "published",
                ns: None,
                build: |feed, xml| {
                    feed.published = read_timestamp(xml, "published");
                    Ok(())
                },
                emit: |feed, spec, out| out.date(spec, feed.published.as_ref()),
            },
            ElementSpec {
                name: "link",
                ns: None,
                build: |feed, xml| {
                    feed.links.push(from_element::<Link>(xml)?);
                    Ok(())
                },
                emit: |feed, spec, out| out.entity_list(spec, feed.links.iter()),
            },
            ElementSpec {
                name: "author",
                ns: None,
                build: |feed, xml| {
                    feed.authors.push(from_element::<Person>(xml)?);
                    Ok(())
                },
                emit: |feed, spec, out| out.entity_list(spec, feed.authors.iter()),
            },
            ElementSpec {
                name: "contributor",
                ns: None,
                build: |feed, xml| {
                    feed.contributors.push(from_element::<Person>(xml)?);
                    Ok(())
                },
                emit: |feed, spec, out| out.entity_list(spec, feed.contributors.iter()),
            },
            ElementSpec {
                name: "category",
                ns: None,
                build: |feed, xml| {
                    feed.categories.push(from_element::<Category>(xml)?);
                    Ok(())
                },
                emit: |feed, spec, out| out.entity_list(spec, feed.categories.iter()),
            },
            ElementSpec {
                name: "entry",
                ns: None,
                build: |feed, xml| {
                    feed.entries.push(from_element::<Entry>(xml)?);
                    Ok(())
                },
                emit: |feed, spec, out| out.entity_list(spec, feed.entries.iter()),
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
