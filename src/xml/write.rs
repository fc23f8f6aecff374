use std::io::Cursor as IoCursor;

use chrono::{DateTime, FixedOffset};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Error;
use crate::xml::schema::{ElementSpec, Schema};

/// Per-call serialization configuration.
///
/// `prefixes` maps namespace prefixes to namespace URIs for pretty output:
/// an element or extension emitted in one of these namespaces gets a
/// prefixed tag (`media:credit`) and the prefix is declared on the document
/// root. Namespaces not listed here are still emitted correctly — the
/// element carries its own `xmlns` declaration instead. There is no global
/// prefix registry; pass options explicitly where the defaults don't fit.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub prefixes: Vec<(String, String)>,
}

impl WriteOptions {
    /// Adds a `(prefix, namespace)` pair, builder-style.
    pub fn with_prefix(mut self, prefix: &str, namespace: &str) -> Self {
        self.prefixes.push((prefix.to_string(), namespace.to_string()));
        self
    }

    fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, ns)| ns == namespace)
            .map(|(p, _)| p.as_str())
    }
}

/// Serializes an entity as a complete XML document (with declaration).
pub fn to_document<T: Schema + 'static>(value: &T) -> Result<String, Error> {
    to_document_with(value, &WriteOptions::default())
}

/// Serializes an entity as a complete XML document using explicit options.
pub fn to_document_with<T: Schema + 'static>(value: &T, options: &WriteOptions) -> Result<String, Error> {
    let mut ctx = EmitCtx::new(options, T::NAMESPACE);
    ctx.writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_err)?;
    write_element(value, T::ROOT_NAME, T::NAMESPACE, true, &mut ctx)?;
    ctx.into_string()
}

/// How a tag is written relative to the enclosing default namespace.
struct Qualified {
    tag: String,
    /// `xmlns` declaration to place on the element, when needed.
    xmlns: Option<String>,
    /// Default namespace in effect for the element's children.
    child_default: String,
}

/// Serialization context: a writer plus the namespace environment.
///
/// Entity bodies are built depth-first into their own context so that an
/// entity which produces no children can be written self-closing.
pub struct EmitCtx<'o> {
    writer: Writer<IoCursor<Vec<u8>>>,
    options: &'o WriteOptions,
    default_ns: String,
}

impl<'o> EmitCtx<'o> {
    fn new(options: &'o WriteOptions, default_ns: &str) -> Self {
        EmitCtx {
            writer: Writer::new(IoCursor::new(Vec::new())),
            options,
            default_ns: default_ns.to_string(),
        }
    }

    fn into_string(self) -> Result<String, Error> {
        String::from_utf8(self.writer.into_inner().into_inner()).map_err(write_err)
    }

    /// Decides tag spelling for an element in namespace `ns` (`None` means
    /// the enclosing default): same namespace → bare tag; a namespace with a
    /// configured prefix → prefixed tag; anything else → bare tag carrying
    /// its own `xmlns` declaration.
    fn qualify(&self, ns: Option<&str>, name: &str) -> Qualified {
        let ns = ns.unwrap_or(&self.default_ns);
        if ns == self.default_ns {
            Qualified {
                tag: name.to_string(),
                xmlns: None,
                child_default: ns.to_string(),
            }
        } else if let Some(prefix) = self.options.prefix_for(ns) {
            Qualified {
                tag: format!("{}:{}", prefix, name),
                xmlns: None,
                // a prefixed tag leaves the default namespace untouched
                child_default: self.default_ns.clone(),
            }
        } else {
            Qualified {
                tag: name.to_string(),
                xmlns: Some(ns.to_string()),
                child_default: ns.to_string(),
            }
        }
    }

    /// Writes one element with escaped text content. Attributes are always
    /// written; `None` or empty text produces a self-closing element.
    pub fn simple(
        &mut self,
        ns: Option<&str>,
        name: &str,
        attrs: &[(&str, String)],
        text: Option<&str>,
    ) -> Result<(), Error> {
        let q = self.qualify(ns, name);
        let mut start = BytesStart::new(q.tag.as_str());
        if let Some(xmlns) = &q.xmlns {
            start.push_attribute(("xmlns", xmlns.as_str()));
        }
        for (key, value) in attrs {
            start.push_attribute((*key, value.as_str()));
        }
        match text {
            Some(t) if !t.is_empty() => {
                self.writer.write_event(Event::Start(start)).map_err(write_err)?;
                self.writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .map_err(write_err)?;
                self.writer
                    .write_event(Event::End(BytesEnd::new(q.tag.as_str())))
                    .map_err(write_err)?;
            }
            _ => {
                self.writer.write_event(Event::Empty(start)).map_err(write_err)?;
            }
        }
        Ok(())
    }

    /// Writes one element whose body is pre-rendered markup, passed through
    /// verbatim (used for inline XHTML).
    pub fn raw_element(
        &mut self,
        ns: Option<&str>,
        name: &str,
        attrs: &[(&str, String)],
        raw: &str,
    ) -> Result<(), Error> {
        let q = self.qualify(ns, name);
        let mut start = BytesStart::new(q.tag.as_str());
        if let Some(xmlns) = &q.xmlns {
            start.push_attribute(("xmlns", xmlns.as_str()));
        }
        for (key, value) in attrs {
            start.push_attribute((*key, value.as_str()));
        }
        self.writer.write_event(Event::Start(start)).map_err(write_err)?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(raw)))
            .map_err(write_err)?;
        self.writer
            .write_event(Event::End(BytesEnd::new(q.tag.as_str())))
            .map_err(write_err)?;
        Ok(())
    }

    /// Emits a single-valued text field; empty and absent values are
    /// skipped.
    pub fn text<T>(&mut self, spec: &ElementSpec<T>, value: Option<&str>) -> Result<(), Error> {
        match value {
            Some(v) if !v.is_empty() => self.simple(spec.ns, spec.name, &[], Some(v)),
            _ => Ok(()),
        }
    }

    /// Emits a timestamp field in RFC 3339 form.
    pub fn date<T>(
        &mut self,
        spec: &ElementSpec<T>,
        value: Option<&DateTime<FixedOffset>>,
    ) -> Result<(), Error> {
        match value {
            Some(ts) => self.simple(spec.ns, spec.name, &[], Some(&ts.to_rfc3339())),
            None => Ok(()),
        }
    }

    /// Emits one element per string, under the rule's (singular) name.
    pub fn text_list<T>(&mut self, spec: &ElementSpec<T>, values: &[String]) -> Result<(), Error> {
        for value in values {
            if !value.is_empty() {
                self.simple(spec.ns, spec.name, &[], Some(value))?;
            }
        }
        Ok(())
    }

    /// Emits a nested entity under the rule's name.
    pub fn entity<T, C: Schema + 'static>(
        &mut self,
        spec: &ElementSpec<T>,
        value: Option<&C>,
    ) -> Result<(), Error> {
        match value {
            Some(v) => write_element(v, spec.name, spec.ns.unwrap_or(C::NAMESPACE), false, self),
            None => Ok(()),
        }
    }

    /// Emits one nested entity per item, under the rule's (singular) name.
    pub fn entity_list<'c, T, C>(
        &mut self,
        spec: &ElementSpec<T>,
        values: impl IntoIterator<Item = &'c C>,
    ) -> Result<(), Error>
    where
        C: Schema + 'c + 'static,
    {
        for value in values {
            write_element(value, spec.name, spec.ns.unwrap_or(C::NAMESPACE), false, self)?;
        }
        Ok(())
    }
}

/// Serializes one entity element: declared rules in declaration order, then
/// extension elements, then the registered attributes on the element's own
/// tag. An entity that produces neither children nor text is written
/// self-closing.
fn write_element<T: Schema + 'static>(
    value: &T,
    name: &str,
    ns: &str,
    root: bool,
    ctx: &mut EmitCtx<'_>,
) -> Result<(), Error> {
    let (tag, mut decls, child_default) = if root {
        let mut decls: Vec<(String, String)> = vec![("xmlns".to_string(), ns.to_string())];
        for (prefix, prefix_ns) in &ctx.options.prefixes {
            if prefix_ns != ns {
                decls.push((format!("xmlns:{}", prefix), prefix_ns.clone()));
            }
        }
        (name.to_string(), decls, ns.to_string())
    } else {
        let q = ctx.qualify(Some(ns), name);
        let decls = match q.xmlns {
            Some(x) => vec![("xmlns".to_string(), x)],
            None => Vec::new(),
        };
        (q.tag, decls, q.child_default)
    };

    let mut inner = EmitCtx::new(ctx.options, &child_default);
    for spec in T::element_specs() {
        (spec.emit)(value, spec, &mut inner)?;
    }
    if let Some(extensions) = value.extensions() {
        for (ext_ns, ext_name, values) in extensions.iter() {
            for v in values {
                inner.simple(Some(ext_ns), ext_name, &[], Some(v))?;
            }
        }
    }
    let body = inner.into_string()?;

    for spec in T::attribute_specs() {
        if let Some(v) = (spec.get)(value) {
            if !v.is_empty() {
                decls.push((spec.name.to_string(), v));
            }
        }
    }

    let mut start = BytesStart::new(tag.as_str());
    for (key, val) in &decls {
        start.push_attribute((key.as_str(), val.as_str()));
    }

    let text = value.text_content().filter(|t| !t.is_empty());
    if body.is_empty() && text.is_none() {
        ctx.writer.write_event(Event::Empty(start)).map_err(write_err)?;
        return Ok(());
    }

    ctx.writer.write_event(Event::Start(start)).map_err(write_err)?;
    if let Some(t) = text {
        ctx.writer
            .write_event(Event::Text(BytesText::new(t)))
            .map_err(write_err)?;
    }
    if !body.is_empty() {
        ctx.writer
            .write_event(Event::Text(BytesText::from_escaped(body.as_str())))
            .map_err(write_err)?;
    }
    ctx.writer
        .write_event(Event::End(BytesEnd::new(tag.as_str())))
        .map_err(write_err)?;
    Ok(())
}

fn write_err<E: std::fmt::Display>(error: E) -> Error {
    Error::Write(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::cursor::Cursor;
    use crate::xml::parse::from_cursor;
    use crate::xml::schema::{AttributeSpec, Extensions};

    #[derive(Debug, Default, PartialEq)]
    struct Contact {
        nick: Option<String>,
        name: Option<String>,
        emails: Vec<String>,
        extensions: Extensions,
    }

    impl Schema for Contact {
        const ROOT_NAME: &'static str = "contact";
        const NAMESPACE: &'static str = "urn:contact";

        fn element_specs() -> &'static [ElementSpec<Self>] {
            static SPECS: &[ElementSpec<Contact>] = &[
                ElementSpec {
                    name: "name",
                    ns: None,
                    build: |c, xml| {
                        c.name = Some(xml.read_string());
                        Ok(())
                    },
                    emit: |c, spec, out| out.text(spec, c.name.as_deref()),
                },
                ElementSpec {
                    name: "email",
                    ns: None,
                    build: |c, xml| {
                        c.emails.push(xml.read_string());
                        Ok(())
                    },
                    emit: |c, spec, out| out.text_list(spec, &c.emails),
                },
            ];
            SPECS
        }

        fn attribute_specs() -> &'static [AttributeSpec<Self>] {
            static SPECS: &[AttributeSpec<Contact>] = &[AttributeSpec {
                name: "nick",
                set: |c, v| c.nick = Some(v.to_string()),
                get: |c| c.nick.clone(),
            }];
            SPECS
        }

        fn extensions(&self) -> Option<&Extensions> {
            Some(&self.extensions)
        }

        fn extensions_mut(&mut self) -> Option<&mut Extensions> {
            Some(&mut self.extensions)
        }
    }

    fn reparse(doc: &str) -> Contact {
        let mut xml = Cursor::new(doc).unwrap();
        from_cursor(&mut xml).unwrap()
    }

    #[test]
    fn test_document_has_declaration_and_namespace() {
        let contact = Contact {
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        let doc = to_document(&contact).unwrap();
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(doc.contains("<contact xmlns=\"urn:contact\">"));
        assert!(doc.contains("<name>Ada</name>"));
    }

    #[test]
    fn test_empty_entity_is_self_closing() {
        let doc = to_document(&Contact::default()).unwrap();
        assert!(doc.contains("<contact xmlns=\"urn:contact\"/>"));
    }

    #[test]
    fn test_write_then_parse_restores_fields() {
        let contact = Contact {
            nick: Some("ada".to_string()),
            name: Some("Ada Lovelace".to_string()),
            emails: vec!["ada@example.org".to_string(), "al@example.org".to_string()],
            ..Default::default()
        };
        let doc = to_document(&contact).unwrap();
        assert_eq!(reparse(&doc), contact);
    }

    #[test]
    fn test_special_characters_survive_escaping() {
        let contact = Contact {
            name: Some("Ada <& \"co\">".to_string()),
            nick: Some("a&b".to_string()),
            ..Default::default()
        };
        let doc = to_document(&contact).unwrap();
        assert_eq!(reparse(&doc), contact);
    }

    #[test]
    fn test_extensions_self_declare_their_namespace() {
        let mut contact = Contact::default();
        contact
            .extensions
            .push("urn:pager", "number", "555-0100".to_string());
        let doc = to_document(&contact).unwrap();
        assert!(doc.contains(r#"<number xmlns="urn:pager">555-0100</number>"#));
        assert_eq!(reparse(&doc), contact);
    }

    #[test]
    fn test_configured_prefix_is_used_and_declared_at_root() {
        let mut contact = Contact::default();
        contact
            .extensions
            .push("urn:pager", "number", "555-0100".to_string());
        let options = WriteOptions::default().with_prefix("pg", "urn:pager");
        let doc = to_document_with(&contact, &options).unwrap();
        assert!(doc.contains(r#"xmlns:pg="urn:pager""#));
        assert!(doc.contains("<pg:number>555-0100</pg:number>"));
        assert_eq!(reparse(&doc), contact);
    }

    #[test]
    fn test_empty_strings_are_not_emitted() {
        let contact = Contact {
            name: Some(String::new()),
            emails: vec![String::new()],
            ..Default::default()
        };
        let doc = to_document(&contact).unwrap();
        assert!(!doc.contains("<name"));
        assert!(!doc.contains("<email"));
    }
}
