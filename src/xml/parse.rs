use chrono::{DateTime, FixedOffset};

use crate::error::Error;
use crate::xml::cursor::Cursor;
use crate::xml::schema::{ElementSpec, Schema};

/// Walks the cursor from its current position, dispatching nodes to `T`'s
/// rule tables and assigning the results to `target`.
///
/// For every element node, in order: a matching element rule consumes the
/// node (and possibly its whole subtree) via its build function; otherwise
/// an element in a foreign namespace is recorded as an extension (when `T`
/// keeps extensions); otherwise the node's attributes are matched against
/// the attribute rules. Anything else — unknown elements, unknown
/// attributes, character data between elements — is skipped silently, so
/// documents carrying markup this schema does not know about still parse.
///
/// The walk ends when `once` is set (a single pass over the current node,
/// used for attribute-only elements), when the document is exhausted, or
/// when advancing would climb above the depth the walk started at. That
/// depth check is the only stop condition — never end-tag names — which
/// keeps same-named descendant elements from terminating an outer walk
/// early. On a depth stop the cursor rests on the closing tag just climbed
/// to, where the enclosing walk expects it.
pub fn parse_into<T: Schema + 'static>(
    target: &mut T,
    xml: &mut Cursor<'_>,
    once: bool,
) -> Result<(), Error> {
    let start_depth = xml.depth();
    loop {
        if xml.is_element() {
            if let Some(spec) = find_spec::<T>(xml) {
                (spec.build)(target, xml)?;
            } else if !capture_extension(target, xml) && !T::attribute_specs().is_empty() {
                for attr in xml.attributes() {
                    if let Some(spec) = T::attribute_specs()
                        .iter()
                        .find(|spec| spec.name == attr.name)
                    {
                        (spec.set)(target, &attr.value);
                    }
                }
            }
        }
        if once || !xml.next() || xml.depth() < start_depth {
            break;
        }
    }
    Ok(())
}

/// Looks up the element rule matching the cursor's current node, if any.
///
/// A rule matches on local name plus namespace: either the rule's explicit
/// namespace or, by default, the owning type's. Documents that declare no
/// namespace at all match by name alone.
fn find_spec<T: Schema + 'static>(xml: &Cursor<'_>) -> Option<&'static ElementSpec<T>> {
    let name = xml.local_name()?;
    T::element_specs().iter().find(|spec| {
        if spec.name != name {
            return false;
        }
        let want = spec.ns.unwrap_or(T::NAMESPACE);
        match xml.namespace() {
            None => true,
            Some(have) => have == want,
        }
    })
}

/// Records the current element as an extension when it lives in a foreign
/// namespace and `T` keeps extensions. Returns whether it was captured.
fn capture_extension<T: Schema>(target: &mut T, xml: &Cursor<'_>) -> bool {
    let Some(namespace) = xml.namespace() else {
        return false;
    };
    if namespace == T::NAMESPACE {
        return false;
    }
    let Some(name) = xml.local_name() else {
        return false;
    };
    let (namespace, name) = (namespace.to_string(), name.to_string());
    let value = xml.read_string();
    match target.extensions_mut() {
        Some(extensions) => {
            extensions.push(&namespace, &name, value);
            true
        }
        None => false,
    }
}

/// Builds a `T` from the element the cursor is currently positioned on.
///
/// The element's identity is taken on trust — rule dispatch or a root
/// constructor has already matched it. Attribute rules are applied first
/// with a single `once` pass. Types with no element rules are
/// simple-content: their text payload is extracted and the cursor is left
/// on the element for the caller to hop over. Everything else steps inside
/// and walks the subtree; a childless element (self-closing or `<e></e>`)
/// skips the walk so the cursor can never leak into following siblings.
pub fn from_element<T: Schema + 'static>(xml: &mut Cursor<'_>) -> Result<T, Error> {
    let mut value = T::default();

    if !T::attribute_specs().is_empty() {
        parse_into(&mut value, xml, true)?;
    }

    if T::element_specs().is_empty() {
        let text = xml.read_string();
        if !text.is_empty() {
            value.set_text_content(text);
        }
        return Ok(value);
    }

    let depth = xml.depth();
    if xml.read() && xml.depth() > depth {
        parse_into(&mut value, xml, false)?;
    }
    Ok(value)
}

/// Root-entity constructor: validates that the cursor is at — or can
/// advance to — an element named `T::ROOT_NAME` in `T::NAMESPACE`, then
/// parses the whole subtree.
///
/// # Errors
///
/// [`Error::InvalidDocument`] when the element the cursor lands on is not
/// the expected root.
pub fn from_cursor<T: Schema + 'static>(xml: &mut Cursor<'_>) -> Result<T, Error> {
    if !xml.current_is(T::ROOT_NAME, Some(T::NAMESPACE)) {
        let advanced = xml.read();
        if !(advanced && xml.current_is(T::ROOT_NAME, Some(T::NAMESPACE))) {
            let found = if advanced {
                xml.local_name().unwrap_or("non-element content").to_string()
            } else {
                "end of document".to_string()
            };
            return Err(Error::InvalidDocument {
                expected: T::ROOT_NAME.to_string(),
                found,
            });
        }
    }
    from_element(xml)
}

/// Reads the current element's text content as an RFC 3339 timestamp.
///
/// Feeds in the wild carry plenty of broken dates; an unparseable value is
/// logged and dropped rather than failing the whole document.
pub(crate) fn read_timestamp(
    xml: &Cursor<'_>,
    field: &'static str,
) -> Option<DateTime<FixedOffset>> {
    let raw = xml.read_string();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(timestamp) => Some(timestamp),
        Err(error) => {
            tracing::warn!(field, value = trimmed, %error, "ignoring unparseable timestamp");
            None
        }
    }
}
