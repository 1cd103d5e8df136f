//! Descriptor type definitions.
//!
//! Supported field types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - bool: Boolean
//! - float: 64-bit floating point
//! - date: RFC 3339 string or integer epoch-milliseconds, normalized to RFC 3339
//! - literal: exact string value
//! - object: nested object with its own field schema
//! - array: homogeneous array with one element type
//!
//! A descriptor is an explicit schema tree built at configuration time. Two
//! shapes exist: an object descriptor (field map plus whole-shape refinement
//! predicates) and a discriminated union (one object branch per tag).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Supported field types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// 64-bit floating point
    Float,
    /// Timestamp, normalized to an RFC 3339 string on validation
    Date,
    /// Exact string value; used for discriminator fields
    Literal {
        /// The required value
        value: String,
    },
    /// Nested object with its own field schema
    Object {
        /// Nested field definitions
        fields: HashMap<String, FieldDef>,
    },
    /// Homogeneous array with single element type
    Array {
        /// Element type (boxed to allow recursive types)
        #[serde(rename = "element_type")]
        element_type: Box<FieldType>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Float => "float",
            FieldType::Date => "date",
            FieldType::Literal { .. } => "literal",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
        }
    }
}

/// Field definition: a type plus a presence requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether field must be present
    pub required: bool,
}

impl FieldDef {
    /// Create a required string field
    pub fn required_string() -> Self {
        Self {
            field_type: FieldType::String,
            required: true,
        }
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self {
            field_type: FieldType::String,
            required: false,
        }
    }

    /// Create a required int field
    pub fn required_int() -> Self {
        Self {
            field_type: FieldType::Int,
            required: true,
        }
    }

    /// Create an optional int field
    pub fn optional_int() -> Self {
        Self {
            field_type: FieldType::Int,
            required: false,
        }
    }

    /// Create a required bool field
    pub fn required_bool() -> Self {
        Self {
            field_type: FieldType::Bool,
            required: true,
        }
    }

    /// Create an optional bool field
    pub fn optional_bool() -> Self {
        Self {
            field_type: FieldType::Bool,
            required: false,
        }
    }

    /// Create a required float field
    pub fn required_float() -> Self {
        Self {
            field_type: FieldType::Float,
            required: true,
        }
    }

    /// Create an optional float field
    pub fn optional_float() -> Self {
        Self {
            field_type: FieldType::Float,
            required: false,
        }
    }

    /// Create a required date field
    pub fn required_date() -> Self {
        Self {
            field_type: FieldType::Date,
            required: true,
        }
    }

    /// Create an optional date field
    pub fn optional_date() -> Self {
        Self {
            field_type: FieldType::Date,
            required: false,
        }
    }

    /// Create a required literal field
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            field_type: FieldType::Literal {
                value: value.into(),
            },
            required: true,
        }
    }

    /// Create a required object field
    pub fn required_object(fields: HashMap<String, FieldDef>) -> Self {
        Self {
            field_type: FieldType::Object { fields },
            required: true,
        }
    }

    /// Create an optional object field
    pub fn optional_object(fields: HashMap<String, FieldDef>) -> Self {
        Self {
            field_type: FieldType::Object { fields },
            required: false,
        }
    }

    /// Create a required array field
    pub fn required_array(element_type: FieldType) -> Self {
        Self {
            field_type: FieldType::Array {
                element_type: Box::new(element_type),
            },
            required: true,
        }
    }

    /// Create an optional array field
    pub fn optional_array(element_type: FieldType) -> Self {
        Self {
            field_type: FieldType::Array {
                element_type: Box::new(element_type),
            },
            required: false,
        }
    }
}

/// A named predicate over the whole validated shape.
///
/// The rule label is what validation errors report when the predicate fails.
#[derive(Clone)]
pub struct Refinement {
    rule: String,
    check: Arc<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>,
}

impl Refinement {
    pub fn new<F>(rule: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            rule: rule.into(),
            check: Arc::new(check),
        }
    }

    /// Returns the rule label
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Runs the predicate against a parsed field map
    pub fn holds(&self, fields: &Map<String, Value>) -> bool {
        (self.check)(fields)
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Refinement({})", self.rule)
    }
}

/// An object-shaped descriptor: field definitions plus refinements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    fields: HashMap<String, FieldDef>,
    // Refinement predicates are closures; they are not serialized with the
    // introspectable shape.
    #[serde(skip)]
    refinements: Vec<Refinement>,
}

impl ObjectDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        fields: HashMap<String, FieldDef>,
        refinements: Vec<Refinement>,
    ) -> Self {
        Self {
            fields,
            refinements,
        }
    }

    /// Add a field definition, replacing any same-named field
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    /// Add a named refinement predicate over the whole shape
    pub fn refine<F>(mut self, rule: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement::new(rule, check));
        self
    }

    /// Returns the field definitions
    pub fn fields(&self) -> &HashMap<String, FieldDef> {
        &self.fields
    }

    /// Returns the refinement predicates, in registration order
    pub fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }
}

/// A discriminated union descriptor: one object branch per tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnionDescriptor {
    discriminator: String,
    tags: Vec<String>,
    branches: HashMap<String, ObjectDescriptor>,
}

impl UnionDescriptor {
    pub(crate) fn new(
        discriminator: impl Into<String>,
        branches_in_order: Vec<(String, ObjectDescriptor)>,
    ) -> Self {
        let tags = branches_in_order.iter().map(|(tag, _)| tag.clone()).collect();
        Self {
            discriminator: discriminator.into(),
            tags,
            branches: branches_in_order.into_iter().collect(),
        }
    }

    /// Returns the discriminator field name
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// Returns the known tags, in declaration order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the branch descriptor for a tag
    pub fn branch(&self, tag: &str) -> Option<&ObjectDescriptor> {
        self.branches.get(tag)
    }
}

/// A composed validation rule over a structural shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Descriptor {
    /// A single object shape
    Object(ObjectDescriptor),
    /// A discriminated union of object shapes
    Union(UnionDescriptor),
}

impl Descriptor {
    /// Returns the descriptor kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Descriptor::Object(_) => "object",
            Descriptor::Union(_) => "union",
        }
    }

    /// Returns the object shape, if this is one
    pub fn as_object(&self) -> Option<&ObjectDescriptor> {
        match self {
            Descriptor::Object(object) => Some(object),
            Descriptor::Union(_) => None,
        }
    }

    /// Returns the union shape, if this is one
    pub fn as_union(&self) -> Option<&UnionDescriptor> {
        match self {
            Descriptor::Union(union) => Some(union),
            Descriptor::Object(_) => None,
        }
    }
}
