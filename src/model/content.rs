use std::fmt;

use crate::error::Error;
use crate::util::collapse_whitespace;
use crate::xml::cursor::Cursor;
use crate::xml::schema::ElementSpec;
use crate::xml::write::EmitCtx;
use crate::XHTML_NS;

/// Payload shared by every [`Content`] variant: the text itself plus the
/// `type` and `xml:lang` attributes as they appeared in the document.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    pub value: String,
    /// The raw `type` attribute, when the document carried one.
    pub content_type: Option<String>,
    pub xml_lang: Option<String>,
}

/// An Atom text construct: `title`, `subtitle`, `summary`, `rights` inside
/// workspaces, and entry `content`.
///
/// The variant is chosen by the element's `type` attribute: `xhtml` and
/// `html` select their variants, anything else (including no attribute at
/// all) is plain text.
///
/// - `Text` keeps the element's character data untouched.
/// - `Html` holds the *unescaped* markup with whitespace runs collapsed to
///   single spaces and the ends trimmed.
/// - `Xhtml` holds inline markup: when the content is wrapped in the
///   XHTML-namespace `div` the Atom specification asks for, only the div's
///   inner markup is kept (collapsed); feeds that skip the wrapper yield
///   the first child element's outer markup unchanged.
///
/// Equality compares the variant and the wrapped string — the `type` and
/// `xml:lang` attributes are presentation detail. Comparing against a plain
/// string compares the wrapped string only.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Content {
    Text(Body),
    Html(Body),
    Xhtml(Body),
}

impl Content {
    /// Builds a plain-text content value, the string-construction path.
    pub fn from_text(value: impl Into<String>) -> Self {
        Content::Text(Body {
            value: value.into(),
            ..Default::default()
        })
    }

    /// Resolves and extracts the content of the element the cursor is on.
    ///
    /// For text and HTML content the cursor does not move (the caller hops
    /// over the element). For XHTML content the extraction walks into the
    /// element; afterwards the cursor rests on the element's closing tag,
    /// which is equally fine for the enclosing walk.
    pub fn from_cursor(xml: &mut Cursor<'_>) -> Result<Self, Error> {
        let content_type = xml.attribute("type").map(str::to_string);
        let xml_lang = xml.attribute("xml:lang").map(str::to_string);
        match content_type.as_deref() {
            Some("xhtml") => Ok(Content::Xhtml(Body {
                value: xhtml_payload(xml),
                content_type,
                xml_lang,
            })),
            Some("html") => Ok(Content::Html(Body {
                value: collapse_whitespace(&xml.read_string()).into_owned(),
                content_type,
                xml_lang,
            })),
            _ => Ok(Content::Text(Body {
                value: xml.read_string(),
                content_type,
                xml_lang,
            })),
        }
    }

    fn body(&self) -> &Body {
        match self {
            Content::Text(body) | Content::Html(body) | Content::Xhtml(body) => body,
        }
    }

    /// The wrapped string.
    pub fn value(&self) -> &str {
        &self.body().value
    }

    /// The `type` attribute as parsed from the document, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.body().content_type.as_deref()
    }

    pub fn xml_lang(&self) -> Option<&str> {
        self.body().xml_lang.as_deref()
    }

    /// The `type` attribute to write out: the parsed one when present,
    /// otherwise the variant's canonical label (plain text needs none).
    fn type_label(&self) -> Option<&str> {
        match self {
            Content::Text(body) => body.content_type.as_deref(),
            Content::Html(body) => Some(body.content_type.as_deref().unwrap_or("html")),
            Content::Xhtml(_) => Some("xhtml"),
        }
    }

    /// Serializes this value under the rule's element name. Empty content
    /// is skipped entirely.
    pub(crate) fn emit<T>(
        &self,
        spec: &ElementSpec<T>,
        ctx: &mut EmitCtx<'_>,
    ) -> Result<(), Error> {
        if self.value().is_empty() {
            return Ok(());
        }
        let mut attrs: Vec<(&str, String)> = Vec::new();
        if let Some(label) = self.type_label() {
            attrs.push(("type", label.to_string()));
        }
        if let Some(lang) = self.xml_lang() {
            attrs.push(("xml:lang", lang.to_string()));
        }
        match self {
            Content::Xhtml(body) => {
                let div = format!(r#"<div xmlns="{}">{}</div>"#, XHTML_NS, body.value);
                ctx.raw_element(spec.ns, spec.name, &attrs, &div)
            }
            _ => ctx.simple(spec.ns, spec.name, &attrs, Some(self.value())),
        }
    }
}

/// Extracts the payload of an `xhtml`-typed element the cursor is on, then
/// climbs back out to the element's closing tag.
fn xhtml_payload(xml: &mut Cursor<'_>) -> String {
    let depth = xml.depth();
    let mut payload = String::new();
    while xml.read() && xml.depth() > depth {
        if xml.is_element() {
            payload = if xml.current_is("div", Some(XHTML_NS)) {
                collapse_whitespace(xml.inner_xml()).into_owned()
            } else {
                xml.outer_xml().to_string()
            };
            break;
        }
    }
    while !(xml.is_end() && xml.depth() <= depth) {
        if !xml.next() {
            break;
        }
    }
    payload
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(Body::default())
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::from_text(value)
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::from_text(value)
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Content::Text(a), Content::Text(b)) => a.value == b.value,
            (Content::Html(a), Content::Html(b)) => a.value == b.value,
            (Content::Xhtml(a), Content::Xhtml(b)) => a.value == b.value,
            _ => false,
        }
    }
}

impl PartialEq<str> for Content {
    fn eq(&self, other: &str) -> bool {
        self.value() == other
    }
}

impl PartialEq<&str> for Content {
    fn eq(&self, other: &&str) -> bool {
        self.value() == *other
    }
}

impl PartialEq<String> for Content {
    fn eq(&self, other: &String) -> bool {
        self.value() == other.as_str()
    }
}

impl PartialEq<Content> for str {
    fn eq(&self, other: &Content) -> bool {
        self == other.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Positions a cursor on the first `<c ...>` element of `doc`.
    fn content_at<'a>(xml: &mut Cursor<'a>) {
        while !(xml.is_element() && xml.local_name() == Some("c")) {
            assert!(xml.read(), "no <c> element in fixture");
        }
    }

    fn parse(doc: &str) -> Content {
        let mut xml = Cursor::new(doc).unwrap();
        content_at(&mut xml);
        Content::from_cursor(&mut xml).unwrap()
    }

    #[test]
    fn test_missing_type_is_text() {
        let content = parse("<r><c>Some text.</c></r>");
        assert!(matches!(content, Content::Text(_)));
        assert_eq!(content, "Some text.");
        assert_eq!(content.content_type(), None);
    }

    #[test]
    fn test_explicit_text_type_is_kept() {
        let content = parse(r#"<r><c type="text">dive into mark</c></r>"#);
        assert!(matches!(content, Content::Text(_)));
        assert_eq!(content.content_type(), Some("text"));
    }

    #[test]
    fn test_html_is_unescaped_and_collapsed() {
        let content = parse(
            "<r><c type=\"html\">A &lt;em&gt;lot&lt;/em&gt; of \n\t  effort</c></r>",
        );
        assert!(matches!(content, Content::Html(_)));
        assert_eq!(content, "A <em>lot</em> of effort");
    }

    #[test]
    fn test_xhtml_div_wrapper_is_stripped() {
        let content = parse(
            r#"<r><c type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml"><p><i>[Update: done.]</i></p></div></c></r>"#,
        );
        assert!(matches!(content, Content::Xhtml(_)));
        assert_eq!(content, "<p><i>[Update: done.]</i></p>");
    }

    #[test]
    fn test_xhtml_div_content_is_collapsed() {
        let content = parse(
            "<r><c type=\"xhtml\"><div xmlns=\"http://www.w3.org/1999/xhtml\">\n  <p>\n    History\n  </p>\n</div></c></r>",
        );
        assert_eq!(content, "<p> History </p>");
    }

    #[test]
    fn test_xhtml_without_div_keeps_outer_markup() {
        let content = parse(
            r#"<r><c type="xhtml"><p xmlns="http://www.w3.org/1999/xhtml">bare</p></c></r>"#,
        );
        assert_eq!(content, r#"<p xmlns="http://www.w3.org/1999/xhtml">bare</p>"#);
    }

    #[test]
    fn test_xhtml_leaves_cursor_on_closing_tag() {
        let mut xml = Cursor::new(
            r#"<r><c type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">x</div></c><after/></r>"#,
        )
        .unwrap();
        content_at(&mut xml);
        Content::from_cursor(&mut xml).unwrap();
        assert!(xml.is_end());
        assert_eq!(xml.local_name(), Some("c"));
        // the enclosing walk's advance lands on the sibling
        assert!(xml.next());
        assert_eq!(xml.local_name(), Some("after"));
    }

    #[test]
    fn test_xml_lang_is_parsed() {
        let content = parse(r#"<r><c type="html" xml:lang="en">x</c></r>"#);
        assert_eq!(content.xml_lang(), Some("en"));
    }

    #[test]
    fn test_equality_ignores_attributes_but_not_variant() {
        let a = Content::from_text("same");
        let b = Content::Text(Body {
            value: "same".to_string(),
            content_type: Some("text".to_string()),
            xml_lang: Some("en".to_string()),
        });
        assert_eq!(a, b);

        let html = Content::Html(Body {
            value: "same".to_string(),
            ..Default::default()
        });
        assert_ne!(a, html);
    }

    #[test]
    fn test_string_comparison_and_display() {
        let content = Content::from_text("hello");
        assert_eq!(content, "hello");
        assert_eq!(content.to_string(), "hello");
    }
}
