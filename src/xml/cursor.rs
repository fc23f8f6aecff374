use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Error;

/// Namespace bound to the reserved `xml:` prefix.
const XML_PREFIX_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// The kind of node a [`Cursor`] can be positioned on.
///
/// Self-closing elements are expanded into a `Start`/`End` pair so that
/// every element has a closing node; comments, processing instructions and
/// the XML declaration are dropped during tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    End,
    Text,
}

/// One attribute of an element node.
///
/// `name` is the attribute name exactly as written in the document,
/// including a namespace prefix when present (e.g. `xml:lang`). `value` is
/// fully unescaped.
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    depth: usize,
    /// Local name for Start/End nodes, empty for text.
    name: String,
    /// Resolved namespace URI of the element, if any is in scope.
    namespace: Option<String>,
    attrs: Vec<Attr>,
    /// Unescaped character data for Text nodes.
    text: String,
    /// Byte spans into the source for raw markup extraction (Start nodes).
    outer_start: usize,
    inner_start: usize,
    inner_end: usize,
    outer_end: usize,
    /// Index of the matching End node (Start nodes only).
    end_index: usize,
}

/// Pull-style cursor over an XML document.
///
/// `quick-xml` exposes a flat event stream; the mapping layer needs a
/// reader-like cursor: current node kind, name, namespace, depth, attribute
/// access, document-order movement that can either step into children
/// ([`read`](Cursor::read)) or hop over a whole subtree
/// ([`next`](Cursor::next)), and raw inner/outer markup extraction for
/// inline XHTML. The cursor tokenizes the document once up front into a
/// document-order node list (recording byte spans into the source text) and
/// then moves an index over it, so lookahead-style operations like
/// [`read_string`](Cursor::read_string) never disturb the position.
///
/// Depth follows the reader convention: the root element is at depth 0, its
/// children at depth 1, and a closing tag carries the same depth as its
/// opening tag.
///
/// A freshly created cursor is positioned *before* the first node; call
/// [`read`](Cursor::read) to enter the document.
pub struct Cursor<'a> {
    source: &'a str,
    nodes: Vec<Node>,
    pos: Option<usize>,
}

impl<'a> Cursor<'a> {
    /// Tokenizes `source` and returns a cursor positioned before the first
    /// node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with a message and line number when the
    /// document is not well formed (mismatched tags, broken markup,
    /// unresolvable entities).
    pub fn new(source: &'a str) -> Result<Self, Error> {
        let nodes = tokenize(source)?;
        Ok(Cursor {
            source,
            nodes,
            pos: None,
        })
    }

    fn node(&self) -> Option<&Node> {
        self.pos.and_then(|i| self.nodes.get(i))
    }

    /// Moves to the next node in document order, descending into children.
    /// Returns `false` (without moving) when the document is exhausted.
    pub fn read(&mut self) -> bool {
        let next = match self.pos {
            None => 0,
            Some(i) => i + 1,
        };
        if next < self.nodes.len() {
            self.pos = Some(next);
            true
        } else {
            false
        }
    }

    /// Moves to the node following the current one, hopping over the current
    /// element's subtree when positioned on an opening tag. Returns `false`
    /// (without moving) when the document is exhausted.
    pub fn next(&mut self) -> bool {
        let Some(i) = self.pos else { return self.read() };
        let next = match self.nodes[i].kind {
            NodeKind::Start => self.nodes[i].end_index + 1,
            _ => i + 1,
        };
        if next < self.nodes.len() {
            self.pos = Some(next);
            true
        } else {
            false
        }
    }

    /// Depth of the current node; 0 before the first [`read`](Cursor::read).
    pub fn depth(&self) -> usize {
        self.node().map_or(0, |n| n.depth)
    }

    /// True when positioned on an opening tag.
    pub fn is_element(&self) -> bool {
        self.node().map_or(false, |n| n.kind == NodeKind::Start)
    }

    /// True when positioned on a closing tag.
    pub fn is_end(&self) -> bool {
        self.node().map_or(false, |n| n.kind == NodeKind::End)
    }

    /// Local name of the current element, if positioned on one.
    pub fn local_name(&self) -> Option<&str> {
        self.node().and_then(|n| match n.kind {
            NodeKind::Text => None,
            _ => Some(n.name.as_str()),
        })
    }

    /// Resolved namespace URI of the current element.
    pub fn namespace(&self) -> Option<&str> {
        self.node().and_then(|n| n.namespace.as_deref())
    }

    /// Attributes of the current element (empty for non-element nodes).
    pub fn attributes(&self) -> &[Attr] {
        self.node().map_or(&[], |n| n.attrs.as_slice())
    }

    /// Looks up one attribute of the current element by its literal name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// True when the current node is an opening tag with the given local
    /// name. When `ns` is given, the element's namespace must match it —
    /// except for documents that declare no namespace at all, which are
    /// accepted as-is.
    pub fn current_is(&self, name: &str, ns: Option<&str>) -> bool {
        let Some(node) = self.node() else { return false };
        if node.kind != NodeKind::Start || node.name != name {
            return false;
        }
        match (ns, node.namespace.as_deref()) {
            (None, _) | (_, None) => true,
            (Some(want), Some(have)) => want == have,
        }
    }

    /// Concatenated character data of the current element's subtree (or of
    /// the current text node). The cursor does not move.
    pub fn read_string(&self) -> String {
        let Some(i) = self.pos else {
            return String::new();
        };
        let node = &self.nodes[i];
        match node.kind {
            NodeKind::Text => node.text.clone(),
            NodeKind::Start => self.nodes[i + 1..node.end_index]
                .iter()
                .filter(|n| n.kind == NodeKind::Text)
                .map(|n| n.text.as_str())
                .collect(),
            NodeKind::End => String::new(),
        }
    }

    /// Raw markup between the current element's opening and closing tags,
    /// exactly as written in the source.
    pub fn inner_xml(&self) -> &'a str {
        match self.node() {
            Some(n) if n.kind == NodeKind::Start => &self.source[n.inner_start..n.inner_end],
            _ => "",
        }
    }

    /// Raw markup of the current element including its own tags.
    pub fn outer_xml(&self) -> &'a str {
        match self.node() {
            Some(n) if n.kind == NodeKind::Start => &self.source[n.outer_start..n.outer_end],
            _ => "",
        }
    }
}

/// 1-based line number of a byte offset in `source`.
fn line_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

fn parse_error(source: &str, offset: usize, message: impl std::fmt::Display) -> Error {
    Error::Parse {
        message: message.to_string(),
        line: line_at(source, offset),
    }
}

/// Resolves a namespace prefix against the currently open binding scopes.
/// The empty prefix resolves to the default namespace; an empty URI unbinds.
fn resolve_ns(scopes: &[Vec<(String, String)>], prefix: &str) -> Option<String> {
    if prefix == "xml" {
        return Some(XML_PREFIX_NS.to_string());
    }
    for scope in scopes.iter().rev() {
        for (p, uri) in scope.iter().rev() {
            if p == prefix {
                if uri.is_empty() {
                    return None;
                }
                return Some(uri.clone());
            }
        }
    }
    None
}

fn split_qname(qname: &str) -> (&str, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qname),
    }
}

/// Splits a start tag's attribute list into namespace bindings declared on
/// the element and ordinary attributes (with unescaped values).
fn collect_attrs(
    source: &str,
    offset: usize,
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<(Vec<(String, String)>, Vec<Attr>), Error> {
    let mut bindings = Vec::new();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed attribute");
                continue;
            }
        };
        let name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| parse_error(source, offset, e))?
            .to_string();
        let raw = std::str::from_utf8(&attr.value)
            .map_err(|e| parse_error(source, offset, e))?;
        let value = match unescape(raw) {
            Ok(v) => v.into_owned(),
            Err(e) => {
                tracing::warn!(attribute = %name, error = %e, "keeping raw attribute value");
                raw.to_string()
            }
        };
        if name == "xmlns" {
            bindings.push((String::new(), value));
        } else if let Some(prefix) = name.strip_prefix("xmlns:") {
            bindings.push((prefix.to_string(), value));
        } else {
            attrs.push(Attr { name, value });
        }
    }
    Ok((bindings, attrs))
}

/// One pass over the event stream, producing the document-order node list.
fn tokenize(source: &str) -> Result<Vec<Node>, Error> {
    let mut reader = Reader::from_str(source);
    let mut nodes: Vec<Node> = Vec::new();
    // Indices of open Start nodes, innermost last.
    let mut open: Vec<usize> = Vec::new();
    // Namespace binding scopes parallel to `open`.
    let mut scopes: Vec<Vec<(String, String)>> = Vec::new();
    let mut depth = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| parse_error(source, reader.buffer_position() as usize, e))?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let (bindings, attrs) = collect_attrs(source, before, &e)?;
                scopes.push(bindings);
                let name = e.name();
                let qname = std::str::from_utf8(name.as_ref())
                    .map_err(|e| parse_error(source, before, e))?;
                let (prefix, local) = split_qname(qname);
                let namespace = resolve_ns(&scopes, prefix);
                open.push(nodes.len());
                nodes.push(Node {
                    kind: NodeKind::Start,
                    depth,
                    name: local.to_string(),
                    namespace,
                    attrs,
                    text: String::new(),
                    outer_start: before,
                    inner_start: after,
                    inner_end: after,
                    outer_end: after,
                    end_index: 0,
                });
                depth += 1;
            }
            Event::End(_) => {
                depth -= 1;
                // check_end_names is on, so the tags are guaranteed to match
                let start = open.pop().expect("end tag without matching start");
                scopes.pop();
                let end_index = nodes.len();
                let (name, namespace) =
                    (nodes[start].name.clone(), nodes[start].namespace.clone());
                nodes[start].inner_end = before;
                nodes[start].outer_end = after;
                nodes[start].end_index = end_index;
                nodes.push(Node {
                    kind: NodeKind::End,
                    depth,
                    name,
                    namespace,
                    attrs: Vec::new(),
                    text: String::new(),
                    outer_start: before,
                    inner_start: before,
                    inner_end: before,
                    outer_end: after,
                    end_index,
                });
            }
            Event::Empty(e) => {
                let (bindings, attrs) = collect_attrs(source, before, &e)?;
                scopes.push(bindings);
                let name = e.name();
                let qname = std::str::from_utf8(name.as_ref())
                    .map_err(|e| parse_error(source, before, e))?;
                let (prefix, local) = split_qname(qname);
                let namespace = resolve_ns(&scopes, prefix);
                scopes.pop();
                let start_index = nodes.len();
                nodes.push(Node {
                    kind: NodeKind::Start,
                    depth,
                    name: local.to_string(),
                    namespace: namespace.clone(),
                    attrs,
                    text: String::new(),
                    outer_start: before,
                    inner_start: after,
                    inner_end: after,
                    outer_end: after,
                    end_index: start_index + 1,
                });
                nodes.push(Node {
                    kind: NodeKind::End,
                    depth,
                    name: local.to_string(),
                    namespace,
                    attrs: Vec::new(),
                    text: String::new(),
                    outer_start: after,
                    inner_start: after,
                    inner_end: after,
                    outer_end: after,
                    end_index: start_index + 1,
                });
            }
            Event::Text(t) => {
                // Character data outside the root element is insignificant.
                if open.is_empty() {
                    continue;
                }
                let text = t
                    .unescape()
                    .map_err(|e| parse_error(source, before, e))?
                    .into_owned();
                nodes.push(Node {
                    kind: NodeKind::Text,
                    depth,
                    name: String::new(),
                    namespace: None,
                    attrs: Vec::new(),
                    text,
                    outer_start: before,
                    inner_start: before,
                    inner_end: after,
                    outer_end: after,
                    end_index: 0,
                });
            }
            Event::CData(c) => {
                if open.is_empty() {
                    continue;
                }
                let text = std::str::from_utf8(&c)
                    .map_err(|e| parse_error(source, before, e))?
                    .to_string();
                nodes.push(Node {
                    kind: NodeKind::Text,
                    depth,
                    name: String::new(),
                    namespace: None,
                    attrs: Vec::new(),
                    text,
                    outer_start: before,
                    inner_start: before,
                    inner_end: after,
                    outer_end: after,
                    end_index: 0,
                });
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, DOCTYPE and
            // anything else the reader may surface carry no model data.
            _ => {}
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str =
        "<root><a>alpha</a><b><c>deep</c></b><empty/><d>tail</d></root>";

    fn at_element<'a>(cursor: &mut Cursor<'a>, name: &str) {
        while !(cursor.is_element() && cursor.local_name() == Some(name)) {
            assert!(cursor.read(), "element <{}> not found", name);
        }
    }

    #[test]
    fn test_read_walks_document_order_with_depths() {
        let mut cursor = Cursor::new(NESTED).unwrap();
        assert!(cursor.read());
        assert_eq!(cursor.local_name(), Some("root"));
        assert_eq!(cursor.depth(), 0);

        assert!(cursor.read());
        assert_eq!(cursor.local_name(), Some("a"));
        assert_eq!(cursor.depth(), 1);

        assert!(cursor.read()); // text "alpha"
        assert!(!cursor.is_element());
        assert_eq!(cursor.depth(), 2);

        assert!(cursor.read()); // </a>
        assert!(cursor.is_end());
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn test_next_hops_over_subtrees() {
        let mut cursor = Cursor::new(NESTED).unwrap();
        cursor.read();
        cursor.read(); // <a>
        assert!(cursor.next());
        assert_eq!(cursor.local_name(), Some("b"));
        assert!(cursor.next());
        assert_eq!(cursor.local_name(), Some("empty"));
    }

    #[test]
    fn test_self_closing_element_has_closing_node() {
        let mut cursor = Cursor::new(NESTED).unwrap();
        at_element(&mut cursor, "empty");
        let depth = cursor.depth();
        assert!(cursor.read());
        assert!(cursor.is_end());
        assert_eq!(cursor.local_name(), Some("empty"));
        assert_eq!(cursor.depth(), depth);
    }

    #[test]
    fn test_childless_element_closes_at_same_depth() {
        let mut cursor = Cursor::new("<root><a></a><b>x</b></root>").unwrap();
        at_element(&mut cursor, "a");
        assert!(cursor.read());
        assert!(cursor.is_end());
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn test_read_string_concatenates_and_unescapes() {
        let mut cursor =
            Cursor::new("<root><t>one &amp; <i>two</i> three</t></root>").unwrap();
        at_element(&mut cursor, "t");
        assert_eq!(cursor.read_string(), "one & two three");
        // the cursor did not move
        assert_eq!(cursor.local_name(), Some("t"));
    }

    #[test]
    fn test_inner_and_outer_xml_are_raw_slices() {
        let mut cursor = Cursor::new(NESTED).unwrap();
        at_element(&mut cursor, "b");
        assert_eq!(cursor.inner_xml(), "<c>deep</c>");
        assert_eq!(cursor.outer_xml(), "<b><c>deep</c></b>");
    }

    #[test]
    fn test_attributes_and_prefixed_names() {
        let mut cursor = Cursor::new(
            r#"<root><t xml:lang="en" type="text">hi</t></root>"#,
        )
        .unwrap();
        at_element(&mut cursor, "t");
        assert_eq!(cursor.attribute("xml:lang"), Some("en"));
        assert_eq!(cursor.attribute("type"), Some("text"));
        assert_eq!(cursor.attribute("missing"), None);
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let mut cursor =
            Cursor::new(r#"<root href="http://e.org/?a=1&amp;b=2"/>"#).unwrap();
        cursor.read();
        assert_eq!(cursor.attribute("href"), Some("http://e.org/?a=1&b=2"));
    }

    #[test]
    fn test_default_namespace_resolution() {
        let mut cursor = Cursor::new(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>t</title></feed>"#,
        )
        .unwrap();
        cursor.read();
        assert_eq!(cursor.namespace(), Some("http://www.w3.org/2005/Atom"));
        cursor.read();
        assert_eq!(cursor.local_name(), Some("title"));
        assert_eq!(cursor.namespace(), Some("http://www.w3.org/2005/Atom"));
    }

    #[test]
    fn test_prefixed_namespace_resolution() {
        let mut cursor = Cursor::new(
            r#"<s xmlns="urn:a" xmlns:b="urn:b"><b:x/><y/></s>"#,
        )
        .unwrap();
        cursor.read();
        cursor.read();
        assert_eq!(cursor.local_name(), Some("x"));
        assert_eq!(cursor.namespace(), Some("urn:b"));
        assert!(cursor.next()); // hop the <b:x/> subtree
        assert_eq!(cursor.local_name(), Some("y"));
        assert_eq!(cursor.namespace(), Some("urn:a"));
    }

    #[test]
    fn test_namespace_scope_ends_with_element() {
        let mut cursor = Cursor::new(
            r#"<s><inner xmlns="urn:x"><a/></inner><outer/></s>"#,
        )
        .unwrap();
        at_element(&mut cursor, "a");
        assert_eq!(cursor.namespace(), Some("urn:x"));
        at_element(&mut cursor, "outer");
        assert_eq!(cursor.namespace(), None);
    }

    #[test]
    fn test_current_is_checks_name_and_namespace() {
        let mut cursor = Cursor::new(r#"<feed xmlns="urn:atom"/>"#).unwrap();
        cursor.read();
        assert!(cursor.current_is("feed", None));
        assert!(cursor.current_is("feed", Some("urn:atom")));
        assert!(!cursor.current_is("feed", Some("urn:other")));
        assert!(!cursor.current_is("entry", None));
    }

    #[test]
    fn test_namespace_free_document_matches_any_namespace() {
        let mut cursor = Cursor::new("<feed/>").unwrap();
        cursor.read();
        assert!(cursor.current_is("feed", Some("urn:atom")));
    }

    #[test]
    fn test_malformed_markup_reports_line() {
        let source = "<root>\n  <a>\n</root>";
        match Cursor::new(source) {
            Err(Error::Parse { line, .. }) => assert!(line >= 2, "line was {}", line),
            other => panic!("expected parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_cdata_is_text() {
        let mut cursor = Cursor::new("<r><t><![CDATA[<raw> & text]]></t></r>").unwrap();
        at_element(&mut cursor, "t");
        assert_eq!(cursor.read_string(), "<raw> & text");
    }

    #[test]
    fn test_exhausted_cursor_stays_put() {
        let mut cursor = Cursor::new("<r/>").unwrap();
        assert!(cursor.read());
        assert!(cursor.read()); // synthesized closing node
        assert!(!cursor.read());
        assert!(cursor.is_end());
        assert!(!cursor.next());
    }
}
