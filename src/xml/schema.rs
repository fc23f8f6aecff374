use crate::error::Error;
use crate::xml::cursor::Cursor;
use crate::xml::write::EmitCtx;

/// One rule mapping an XML child element onto a field of `T`.
///
/// Rules are declared once per type in a `static` table (see [`Schema`]) and
/// shared read-only by every instance and every concurrent parse. Collection
/// fields register under the *singular* element name (`entry`, not
/// `entries`), which is the name child elements actually carry.
///
/// `build` consumes the matched element from the cursor and assigns or
/// appends the resulting value; `emit` writes the field back out. Both are
/// plain function pointers resolved when the table is defined, so there is
/// no name-based dispatch at parse time.
pub struct ElementSpec<T> {
    /// Local element name to match.
    pub name: &'static str,
    /// Explicit namespace to match and emit in. `None` means the owning
    /// type's namespace.
    pub ns: Option<&'static str>,
    pub build: fn(&mut T, &mut Cursor<'_>) -> Result<(), Error>,
    pub emit: fn(&T, &ElementSpec<T>, &mut EmitCtx<'_>) -> Result<(), Error>,
}

/// One rule mapping an XML attribute onto a field of `T`.
///
/// `name` is the attribute name exactly as it appears in documents; a
/// colon-bearing name such as `xml:lang` maps onto an underscore-joined
/// field (`xml_lang`) and is reconstructed verbatim when serializing.
pub struct AttributeSpec<T> {
    pub name: &'static str,
    pub set: fn(&mut T, &str),
    pub get: fn(&T) -> Option<String>,
}

/// Binds a type to its element/attribute rule tables.
///
/// The tables are per-type static metadata: immutable once built, field
/// order fixes serialization order, and parsing accepts the declared
/// elements in any document order.
pub trait Schema: Default {
    /// Local name of the element this type is constructed from.
    const ROOT_NAME: &'static str;
    /// Namespace the type's elements live in.
    const NAMESPACE: &'static str;

    fn element_specs() -> &'static [ElementSpec<Self>];
    fn attribute_specs() -> &'static [AttributeSpec<Self>];

    /// Character-data payload for simple-content elements (e.g. the name
    /// inside `<generator>`). Types without text content return `None`.
    fn text_content(&self) -> Option<&str> {
        None
    }

    /// Assigns the character-data payload during parsing.
    fn set_text_content(&mut self, _text: String) {}

    /// Extension-element storage, for types that keep unrecognized
    /// foreign-namespace elements instead of dropping them.
    fn extensions(&self) -> Option<&Extensions> {
        None
    }

    fn extensions_mut(&mut self) -> Option<&mut Extensions> {
        None
    }
}

/// Ordered storage for extension elements.
///
/// Feeds routinely carry elements from namespaces the schema does not
/// declare (Media RSS, Dublin Core, ...). Instead of dropping them, the
/// parse engine records each foreign-namespace element's text content here,
/// keyed by `(namespace, local name)` in first-seen document order, and the
/// serializer writes them back after the declared elements.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extensions {
    entries: Vec<((String, String), Vec<String>)>,
}

impl Extensions {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a value for `(namespace, name)`, keeping document order.
    pub fn push(&mut self, namespace: &str, name: &str, value: String) {
        if let Some((_, values)) = self
            .entries
            .iter_mut()
            .find(|((ns, n), _)| ns == namespace && n == name)
        {
            values.push(value);
        } else {
            self.entries
                .push(((namespace.to_string(), name.to_string()), vec![value]));
        }
    }

    /// All values recorded for `(namespace, name)`; empty when none.
    pub fn get(&self, namespace: &str, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|((ns, n), _)| ns == namespace && n == name)
            .map_or(&[], |(_, values)| values.as_slice())
    }

    /// Iterates `(namespace, name, values)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[String])> {
        self.entries
            .iter()
            .map(|((ns, n), values)| (ns.as_str(), n.as_str(), values.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_group_by_namespace_and_name() {
        let mut ext = Extensions::default();
        ext.push("urn:media", "credit", "a".to_string());
        ext.push("urn:dc", "creator", "b".to_string());
        ext.push("urn:media", "credit", "c".to_string());

        assert_eq!(ext.get("urn:media", "credit"), ["a", "c"]);
        assert_eq!(ext.get("urn:dc", "creator"), ["b"]);
        assert!(ext.get("urn:media", "missing").is_empty());
    }

    #[test]
    fn test_extensions_iteration_keeps_first_seen_order() {
        let mut ext = Extensions::default();
        ext.push("urn:b", "x", "1".to_string());
        ext.push("urn:a", "y", "2".to_string());

        let keys: Vec<(&str, &str)> = ext.iter().map(|(ns, n, _)| (ns, n)).collect();
        assert_eq!(keys, [("urn:b", "x"), ("urn:a", "y")]);
    }
}
