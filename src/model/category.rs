use crate::xml::schema::{AttributeSpec, ElementSpec, Schema};
use crate::ATOM_NS;

/// A `category` element. Attribute-only: the `term` identifies the
/// category, with an optional categorization `scheme` and display `label`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category {
    pub term: Option<String>,
    pub scheme: Option<String>,
    pub label: Option<String>,
}

impl Schema for Category {
    const ROOT_NAME: &'static str = "category";
    const NAMESPACE: &'static str = ATOM_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        &[]
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        static SPECS: &[AttributeSpec<Category>] = &[
            AttributeSpec {
                name: "term",
                set: |category, value| category.term = Some(value.to_string()),
                get: |category| category.term.clone(),
            },
            AttributeSpec {
                name: "scheme",
                set: |category, value| category.scheme = Some(value.to_string()),
                get: |category| category.scheme.clone(),
            },
            AttributeSpec {
                name: "label",
                set: |category, value| category.label = Some(value.to_string()),
                get: |category| category.label.clone(),
            },
        ];
        SPECS
    }
}
