use crate::xml::schema::{AttributeSpec, ElementSpec, Schema};
use crate::ATOM_NS;

/// An Atom person construct, used for both `author` and `contributor`
/// elements.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub email: Option<String>,
}

impl Person {
    pub fn named(name: impl Into<String>) -> Self {
        Person {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl Schema for Person {
    const ROOT_NAME: &'static str = "author";
    const NAMESPACE: &'static str = ATOM_NS;

    fn element_specs() -> &'static [ElementSpec<Self>] {
        static SPECS: &[ElementSpec<Person>] = &[
            ElementSpec {
                name: "name",
                ns: None,
                build: |person, xml| {
                    person.name = Some(xml.read_string());
                    Ok(())
                },
                emit: |person, spec, out| out.text(spec, person.name.as_deref()),
            },
            ElementSpec {
                name: "uri",
                ns: None,
                build: |person, xml| {
                    person.uri = Some(xml.read_string());
                    Ok(())
                },
                emit: |person, spec, out| out.text(spec, person.uri.as_deref()),
            },
            ElementSpec {
                name: "email",
                ns: None,
                build: |person, xml| {
                    person.email = Some(xml.read_string());
                    Ok(())
                },
                emit: |person, spec, out| out.text(spec, person.email.as_deref()),
            },
        ];
        SPECS
    }

    fn attribute_specs() -> &'static [AttributeSpec<Self>] {
        &[]
    }
}
