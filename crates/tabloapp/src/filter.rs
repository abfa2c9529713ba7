//! Query filters: an immutable predicate tree plus the schema-aware
//! builder that constructs its leaves.

use serde_json::{json, Map, Value};

use crate::codec::PropertyKind;
use crate::error::{Result, TabloError};
use crate::schema::{PropertyInfo, Schema};
use crate::value::PropertyValue;

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// Checkbox state; polarity lives in the bool itself
    CheckboxEquals(bool),
    SelectEquals { name: String, negated: bool },
    TextContains { text: String, negated: bool },
    NumberEquals { number: f64, negated: bool },
}

impl Predicate {
    fn inverted(&self) -> Self {
        match self {
            Self::CheckboxEquals(state) => Self::CheckboxEquals(!state),
            Self::SelectEquals { name, negated } => Self::SelectEquals {
                name: name.clone(),
                negated: !negated,
            },
            Self::TextContains { text, negated } => Self::TextContains {
                text: text.clone(),
                negated: !negated,
            },
            Self::NumberEquals { number, negated } => Self::NumberEquals {
                number: *number,
                negated: !negated,
            },
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::CheckboxEquals(state) => json!({ "equals": state }),
            Self::SelectEquals { name, negated: false } => json!({ "equals": name }),
            Self::SelectEquals { name, negated: true } => json!({ "does_not_equal": name }),
            Self::TextContains { text, negated: false } => json!({ "contains": text }),
            Self::TextContains { text, negated: true } => json!({ "does_not_contain": text }),
            Self::NumberEquals { number, negated: false } => json!({ "equals": number }),
            Self::NumberEquals { number, negated: true } => json!({ "does_not_equal": number }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        field_id: String,
        tag: String,
        predicate: Predicate,
    },
    And(Vec<Node>),
    Or(Vec<Node>),
}

impl Node {
    fn inverted(&self) -> Self {
        match self {
            Self::Leaf {
                field_id,
                tag,
                predicate,
            } => Self::Leaf {
                field_id: field_id.clone(),
                tag: tag.clone(),
                predicate: predicate.inverted(),
            },
            // De Morgan: negation distributes over the flipped group.
            Self::And(nodes) => Self::Or(nodes.iter().map(Node::inverted).collect()),
            Self::Or(nodes) => Self::And(nodes.iter().map(Node::inverted).collect()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Leaf {
                field_id,
                tag,
                predicate,
            } => {
                let mut leaf = Map::new();
                leaf.insert("property".to_string(), Value::String(field_id.clone()));
                leaf.insert(tag.clone(), predicate.to_json());
                Value::Object(leaf)
            }
            Self::And(nodes) => {
                json!({ "and": nodes.iter().map(Node::to_json).collect::<Vec<_>>() })
            }
            Self::Or(nodes) => {
                json!({ "or": nodes.iter().map(Node::to_json).collect::<Vec<_>>() })
            }
        }
    }
}

/// A composable query predicate.
///
/// Filters are immutable; combinators and negation return new trees and
/// never touch their inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    node: Node,
}

impl Filter {
    /// All of the given filters must hold.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Filter {
        Filter {
            node: Node::And(filters.into_iter().map(|filter| filter.node).collect()),
        }
    }

    /// At least one of the given filters must hold.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Filter {
        Filter {
            node: Node::Or(filters.into_iter().map(|filter| filter.node).collect()),
        }
    }

    /// Logical negation: leaf polarities flip, And/Or groups swap.
    pub fn invert(&self) -> Filter {
        Filter {
            node: self.node.inverted(),
        }
    }

    /// Serialize to the query wire format.
    pub fn to_json(&self) -> Value {
        self.node.to_json()
    }
}

impl std::ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        self.invert()
    }
}

/// Builder view over a fetched schema.
///
/// Leaves are built from declared fields only, so a filter can never
/// name a field the database does not have.
pub struct Filters<'s> {
    schema: &'s Schema,
}

impl<'s> Filters<'s> {
    pub(crate) fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Resolve a field name (normalized) to its leaf builder.
    pub fn field(&self, name: &str) -> Result<FilterField<'s>> {
        Ok(FilterField {
            info: self.schema.field(name)?,
        })
    }
}

/// Kind-checked leaf builder for one field.
#[derive(Debug)]
pub struct FilterField<'s> {
    info: &'s PropertyInfo,
}

impl FilterField<'_> {
    /// Equality leaf. Accepts a checkbox state, a select option name or
    /// a number, matching the field's kind.
    pub fn equals(&self, value: impl Into<PropertyValue>) -> Result<Filter> {
        self.equality(value.into(), false)
    }

    /// Negated equality leaf.
    pub fn not_equals(&self, value: impl Into<PropertyValue>) -> Result<Filter> {
        self.equality(value.into(), true)
    }

    pub fn is_true(&self) -> Result<Filter> {
        self.equals(true)
    }

    pub fn is_false(&self) -> Result<Filter> {
        self.equals(false)
    }

    /// Substring leaf for title and rich text fields.
    pub fn contains(&self, text: &str) -> Result<Filter> {
        self.containment(text, false)
    }

    /// Negated substring leaf.
    pub fn not_contains(&self, text: &str) -> Result<Filter> {
        self.containment(text, true)
    }

    fn equality(&self, value: PropertyValue, negated: bool) -> Result<Filter> {
        let predicate = match (self.info.kind, value) {
            (Some(PropertyKind::Checkbox), PropertyValue::Checkbox(state)) => {
                Predicate::CheckboxEquals(if negated { !state } else { state })
            }
            (Some(PropertyKind::Select), PropertyValue::Text(name)) => {
                Predicate::SelectEquals { name, negated }
            }
            (Some(PropertyKind::Number), PropertyValue::Number(number)) => {
                Predicate::NumberEquals { number, negated }
            }
            (_, value) => return Err(self.wrong_kind(value.kind_name())),
        };
        Ok(self.leaf(predicate))
    }

    fn containment(&self, text: &str, negated: bool) -> Result<Filter> {
        match self.info.kind {
            Some(PropertyKind::Title) | Some(PropertyKind::RichText) => {
                Ok(self.leaf(Predicate::TextContains {
                    text: text.to_string(),
                    negated,
                }))
            }
            _ => Err(self.wrong_kind("contains")),
        }
    }

    fn leaf(&self, predicate: Predicate) -> Filter {
        Filter {
            node: Node::Leaf {
                field_id: self.info.field_id.clone(),
                tag: self.info.tag.clone(),
                predicate,
            },
        }
    }

    fn wrong_kind(&self, wanted: &'static str) -> TabloError {
        TabloError::InvalidFilterType {
            field: self.info.raw_name.clone(),
            tag: self.info.tag.clone(),
            wanted,
        }
    }
}
