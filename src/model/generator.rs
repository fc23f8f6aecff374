use crate::xml::schema::{AttributeSpec, ElementSpec, Schema};
use crate::ATOM_NS;

/// The `generator` element: the agent that produced the feed.
///
/// A simple-content element — the software name is the element's text, with
/// `uri` and `version` carried as attributes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generator {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub version: Option<String>,
}

impl Schema for Generator {
    const ROOT_NAME: &'static str = "generator";
    const NAMESPACE: &'static str = ATOM_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        &[]
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        static SPECS: &[AttributeSpec<Generator>] = &[
            AttributeSpec {
                name: "uri",
                set: |generator, value| generator.uri = Some(value.to_string()),
                get: |generator| generator.uri.clone(),
            },
            AttributeSpec {
                name: "version",
                set: |generator, value| generator.version = Some(value.to_string()),
                get: |generator| generator.version.clone(),
            },
        ];
        SPECS
    }

    fn text_content(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_text_content(&mut self, text: String) {
        self.name = Some(text);
    }
}
