use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::xml::schema::{AttributeSpec, ElementSpec, Schema};
use crate::ATOM_NS;

/// A `link` element: a relation-typed reference to another resource.
///
/// Attribute-only; the relation (`rel`) gives the link its meaning:
/// `alternate`, `self`, `via`, `enclosure`, `edit`, and the pagination
/// relations `first`/`last`/`next`/`prev`. A link without an explicit
/// relation is an alternate link by convention.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub href: Option<String>,
    pub rel: Option<String>,
    /// The advisory `type` attribute (a media type).
    pub media_type: Option<String>,
    /// The advisory `length` attribute, in bytes.
    pub length: Option<u64>,
}

impl Link {
    /// Shorthand for the common relation + target construction.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Link {
            rel: Some(rel.into()),
            href: Some(href.into()),
            ..Default::default()
        }
    }

    fn rel_is(&self, rel: &str) -> bool {
        self.rel.as_deref() == Some(rel)
    }
}

/// A link renders as its target, which is what callers almost always want.
impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href.as_deref().unwrap_or(""))
    }
}

impl Schema for Link {
    const ROOT_NAME: &'static str = "link";
    const NAMESPACE: &'static str = ATOM_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        &[]
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        static SPECS: &[AttributeSpec<Link>] = &[
            AttributeSpec {
                name: "href",
                set: |link, value| link.href = Some(value.to_string()),
                get: |link| link.href.clone(),
            },
            AttributeSpec {
                name: "rel",
                set: |link, value| link.rel = Some(value.to_string()),
                get: |link| link.rel.clone(),
            },
            AttributeSpec {
                name: "type",
                set: |link, value| link.media_type = Some(value.to_string()),
                get: |link| link.media_type.clone(),
            },
            AttributeSpec {
                name: "length",
                set: |link, value| match value.parse() {
                    Ok(length) => link.length = Some(length),
                    Err(_) => {
                        tracing::warn!(value, "ignoring non-numeric link length");
                    }
                },
                get: |link| link.length.filter(|n| *n != 0).map(|n| n.to_string()),
            },
        ];
        SPECS
    }
}

/// An ordered collection of links with relation-based accessor views.
///
/// Every lookup is first-match-wins in document order. Dereferences to the
/// underlying `Vec` for iteration and mutation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Links(Vec<Link>);

impl Links {
    pub fn new(links: Vec<Link>) -> Self {
        Links(links)
    }

    /// The first alternate link. A link with no `rel` attribute counts as
    /// an alternate here — and only here.
    pub fn alternate(&self) -> Option<&Link> {
        self.0
            .iter()
            .find(|l| l.rel.is_none() || l.rel_is("alternate"))
    }

    /// All alternate links (explicit or by omitted `rel`), in order.
    pub fn alternates(&self) -> Vec<&Link> {
        self.0
            .iter()
            .filter(|l| l.rel.is_none() || l.rel_is("alternate"))
            .collect()
    }

    /// The feed's link to itself.
    pub fn self_link(&self) -> Option<&Link> {
        self.0.iter().find(|l| l.rel_is("self"))
    }

    /// The source this document was obtained via.
    pub fn via(&self) -> Option<&Link> {
        self.0.iter().find(|l| l.rel_is("via"))
    }

    pub fn first_page(&self) -> Option<&Link> {
        self.0.iter().find(|l| l.rel_is("first"))
    }

    pub fn last_page(&self) -> Option<&Link> {
        self.0.iter().find(|l| l.rel_is("last"))
    }

    pub fn next_page(&self) -> Option<&Link> {
        self.0.iter().find(|l| l.rel_is("next"))
    }

    pub fn prev_page(&self) -> Option<&Link> {
        self.0
            .iter()
            .find(|l| l.rel_is("prev") || l.rel_is("previous"))
    }

    /// All enclosure links, in order.
    pub fn enclosures(&self) -> Vec<&Link> {
        self.0.iter().filter(|l| l.rel_is("enclosure")).collect()
    }

    /// The publishing-protocol edit link.
    pub fn edit(&self) -> Option<&Link> {
        self.0.iter().find(|l| l.rel_is("edit"))
    }

    pub(crate) fn edit_mut(&mut self) -> Option<&mut Link> {
        self.0.iter_mut().find(|l| l.rel_is("edit"))
    }
}

impl Deref for Links {
    type Target = Vec<Link>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Links {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Link>> for Links {
    fn from(links: Vec<Link>) -> Self {
        Links(links)
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
