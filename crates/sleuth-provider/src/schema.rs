//! Declarative attribute schemas for the provider's resources.
//!
//! Each resource describes its attributes (required/optional/computed,
//! defaults, nested blocks); the description is serialized for the host's
//! schema dump. Concrete default values also live on the plan structs as
//! serde defaults; the schema declares them so the host can render them.

use serde::Serialize;
use serde_json::Value;

/// Attribute value type at the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrType {
    String,
    Int,
    Float,
    Bool,
    ListString,
    SetInt,
    Block,
    BlockList,
}

fn is_empty_str(s: &&str) -> bool {
    s.is_empty()
}

/// One attribute in a resource schema.
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub attr_type: AttrType,
    pub required: bool,
    pub computed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "is_empty_str")]
    pub description: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block: Vec<Attribute>,
}

impl Attribute {
    fn new(name: &'static str, attr_type: AttrType) -> Self {
        Attribute {
            name,
            attr_type,
            required: false,
            computed: false,
            default: None,
            description: "",
            block: Vec::new(),
        }
    }

    pub fn required(name: &'static str, attr_type: AttrType) -> Self {
        Attribute {
            required: true,
            ..Self::new(name, attr_type)
        }
    }

    pub fn optional(name: &'static str, attr_type: AttrType) -> Self {
        Self::new(name, attr_type)
    }

    pub fn computed(name: &'static str, attr_type: AttrType) -> Self {
        Attribute {
            computed: true,
            ..Self::new(name, attr_type)
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn with_block(mut self, block: Vec<Attribute>) -> Self {
        self.block = block;
        self
    }
}

/// A resource schema: versioned attribute list.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub version: u32,
    #[serde(skip_serializing_if = "is_empty_str")]
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: &'static str, attributes: Vec<Attribute>) -> Self {
        Schema {
            version: 1,
            description,
            attributes,
        }
    }

    /// Look up a declared attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_builders_set_flags() {
        let attr = Attribute::required("name", AttrType::String);
        assert!(attr.required);
        assert!(!attr.computed);

        let attr = Attribute::computed("slug", AttrType::String);
        assert!(attr.computed);

        let attr = Attribute::optional("color", AttrType::String).with_default("#cecece");
        assert_eq!(attr.default, Some(Value::from("#cecece")));
    }

    #[test]
    fn test_schema_serializes_defaults_and_blocks() {
        let schema = Schema::new(
            "test resource",
            vec![
                Attribute::required("name", AttrType::String),
                Attribute::optional("mappings", AttrType::BlockList).with_block(vec![
                    Attribute::required("environment_slug", AttrType::String),
                    Attribute::required("branch", AttrType::String),
                ]),
            ],
        );
        let value = serde_json::to_value(&schema).expect("serialize");
        assert_eq!(value["attributes"][0]["name"], "name");
        assert_eq!(
            value["attributes"][1]["block"][1]["name"],
            "branch"
        );
        // Unset defaults stay out of the dump.
        assert!(value["attributes"][0].get("default").is_none());
    }

    #[test]
    fn test_attribute_lookup() {
        let schema = Schema::new("r", vec![Attribute::required("name", AttrType::String)]);
        assert!(schema.attribute("name").is_some());
        assert!(schema.attribute("ghost").is_none());
    }
}
