use chrono::{DateTime, FixedOffset};

use crate::error::Error;
use crate::model::content::Content;
use crate::model::generator::Generator;
use crate::model::link::{Link, Links};
use crate::model::person::Person;
use crate::xml::cursor::Cursor;
use crate::xml::parse::{from_element, read_timestamp};
use crate::xml::schema::{AttributeSpec, ElementSpec, Extensions, Schema};
use crate::ATOM_NS;

/// The `source` element: feed metadata preserved when an entry is copied
/// out of its original feed. Structurally a feed without entries.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Source {
    pub id: Option<String>,
    pub title: Option<Content>,
    pub subtitle: Option<Content>,
    pub rights: Option<String>,
    pub icon: Option<String>,
    pub logo: Option<String>,
    pub generator: Option<Generator>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub links: Links,
    pub authors: Vec<Person>,
    pub contributors: Vec<Person>,
    pub extensions: Extensions,
}

impl Source {
    /// Parses a standalone `source` element from text.
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        crate::loader::from_xml_str(xml)
    }

    /// Constructs a source from a cursor positioned at (or just before) a
    /// `source` element.
    pub fn from_cursor(xml: &mut Cursor<'_>) -> Result<Self, Error> {
        crate::xml::parse::from_cursor(xml)
    }

    /// Serializes this source as a standalone document.
    pub fn to_xml(&self) -> Result<String, Error> {
        crate::xml::write::to_document(self)
    }

    /// The first alternate link of the original feed.
    pub fn alternate(&self) -> Option<&Link> {
        self.links.alternate()
    }
}

impl Schema for Source {
    const ROOT_NAME: &'static str = "source";
    const NAMESPACE: &'static str = ATOM_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        static SPECS: &[ElementSpec<Source>] = &[
            ElementSpec {
                name: "id",
                ns: None,
                build: |source, xml| {
                    source.id = Some(xml.read_string());
                    Ok(())
                },
                emit: |source, spec, out| out.text(spec, source.id.as_deref()),
            },
            ElementSpec {
                name: "title",
                ns: None,
                build: |source, xml| {
                    source.title = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |source, spec, out| match &source.title {
                    Some(title) => title.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "subtitle",
                ns: None,
                build: |source, xml| {
                    source.subtitle = Some(Content::from_cursor(xml)?);
                    Ok(())
                },
                emit: |source, spec, out| match &source.subtitle {
                    Some(subtitle) => subtitle.emit(spec, out),
                    None => Ok(()),
                },
            },
            ElementSpec {
                name: "rights",
                ns: None,
                build: |source, xml| {
                    source.rights = Some(xml.read_string());
                    Ok(())
                },
                emit: |source, spec, out| out.text(spec, source.rights.as_deref()),
            },
            ElementSpec {
                name: "icon",
                ns: None,
                build: |source, xml| {
                    source.icon = Some(xml.read_string());
                    Ok(())
                },
                emit: |source, spec, out| out.text(spec, source.icon.as_deref()),
            },
            ElementSpec {
                name: "logo",
                ns: None,
                build: |source, xml| {
                    source.logo = Some(xml.read_string());
                    Ok(())
                },
                emit: |source, spec, out| out.text(spec, source.logo.as_deref()),
            },
            ElementSpec {
                name: "generator",
                ns: None,
                build: |source, xml| {
                    source.generator = Some(from_element::<Generator>(xml)?);
                    Ok(())
                },
                emit: |source, spec, out| out.entity(spec, source.generator.as_ref()),
            },
            ElementSpec {
                name: "updated",
                ns: None,
                build: |source, xml| {
                    source.updated = read_timestamp(xml, "updated");
                    Ok(())
                },
                emit: |source, spec, out| out.date(spec, source.updated.as_ref()),
            },
            ElementSpec {
                name: "link",
                ns: None,
                build: |source, xml| {
                    source.links.push(from_element::<Link>(xml)?);
                    Ok(())
                },
                emit: |source, spec, out| out.entity_list(spec, source.links.iter()),
            },
            ElementSpec {
                name: "author",
                ns: None,
                build: |source, xml| {
                    source.authors.push(from_element::<Person>(xml)?);
                    Ok(())
                },
                emit: |source, spec, out| out.entity_list(spec, source.authors.iter()),
            },
            ElementSpec {
                name: "contributor",
                ns: None,
                build: |source, xml| {
                    source.contributors.push(from_element::<Person>(xml)?);
                    Ok(())
                },
                emit: |source, spec, out| out.entity_list(spec, source.contributors.iter()),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::cursor::Cursor;
    use crate::xml::parse::from_cursor;

    #[test]
    fn test_parse_source_metadata() {
        let mut xml = Cursor::new(
            r#"<source xmlns="http://www.w3.org/2005/Atom">
                <id>tag:example.org,2003:3</id>
                <title>dive into mark</title>
                <updated>2005-07-31T12:29:29Z</updated>
                <link rel="self" href="http://example.org/feed.atom"/>
                <author><name>Mark Pilgrim</name></author>
            </source>"#,
        )
        .unwrap();
        let source: Source = from_cursor(&mut xml).unwrap();
        assert_eq!(source.id.as_deref(), Some("tag:example.org,2003:3"));
        assert_eq!(source.title.as_ref().unwrap(), "dive into mark");
        assert_eq!(
            source.links.self_link().unwrap().href.as_deref(),
            Some("http://example.org/feed.atom")
        );
        assert_eq!(source.authors.len(), 1);
    }
}
