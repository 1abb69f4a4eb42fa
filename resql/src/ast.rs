use crate::parser::infer_literal;
use crate::property::PropertyId;
use crate::value::Value;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Comparison {
        property: PropertyId,
        operator: ComparisonOperator,
        value: Value,
    },
    /// IN-style membership, equivalent to an OR of equalities
    In {
        property: PropertyId,
        values: Vec<Value>,
    },
    /// True when the category is absent or has no entries
    IsEmpty(PropertyId),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// Matches every resource
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,              // =
    NotEqual,           // !=
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    LessThan,           // <
    LessThanOrEqual,    // <=
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
        }
    }

    pub fn is_ordering(&self) -> bool { !matches!(self, ComparisonOperator::Equal | ComparisonOperator::NotEqual) }
}

impl Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.symbol()) }
}

impl Predicate {
    pub fn comparison(property: impl Into<PropertyId>, operator: ComparisonOperator, value: impl Into<Value>) -> Self {
        Predicate::Comparison { property: property.into(), operator, value: value.into() }
    }

    pub fn equals(property: impl Into<PropertyId>, value: impl Into<Value>) -> Self {
        Self::comparison(property, ComparisonOperator::Equal, value)
    }

    pub fn not_equals(property: impl Into<PropertyId>, value: impl Into<Value>) -> Self {
        Self::comparison(property, ComparisonOperator::NotEqual, value)
    }

    pub fn is_in<V: Into<Value>>(property: impl Into<PropertyId>, values: impl IntoIterator<Item = V>) -> Self {
        Predicate::In { property: property.into(), values: values.into_iter().map(Into::into).collect() }
    }

    pub fn negate(self) -> Self { Predicate::Not(Box::new(self)) }

    /// AND of the given predicates, flattening nested ANDs. `None` if there are none.
    pub fn conjunction(predicates: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        Self::flatten(predicates, true)
    }

    /// OR of the given predicates, flattening nested ORs. `None` if there are none.
    pub fn disjunction(predicates: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        Self::flatten(predicates, false)
    }

    fn flatten(predicates: impl IntoIterator<Item = Predicate>, and: bool) -> Option<Predicate> {
        let mut children = Vec::new();
        for predicate in predicates {
            match (predicate, and) {
                (Predicate::And(inner), true) | (Predicate::Or(inner), false) => children.extend(inner),
                (other, _) => children.push(other),
            }
        }
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ if and => Some(Predicate::And(children)),
            _ => Some(Predicate::Or(children)),
        }
    }

    /// The property a leaf predicate refers to; `Not` is looked through
    pub fn leaf_property(&self) -> Option<&PropertyId> {
        match self {
            Predicate::Comparison { property, .. } | Predicate::In { property, .. } | Predicate::IsEmpty(property) => Some(property),
            Predicate::Not(inner) => inner.leaf_property(),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool { matches!(self, Predicate::Comparison { .. } | Predicate::In { .. } | Predicate::IsEmpty(_)) }

    /// Every property id referenced anywhere in the tree, in first-seen order
    pub fn property_ids(&self) -> IndexSet<PropertyId> {
        let mut ids = IndexSet::new();
        self.collect_property_ids(&mut ids);
        ids
    }

    fn collect_property_ids(&self, ids: &mut IndexSet<PropertyId>) {
        match self {
            Predicate::Comparison { property, .. } | Predicate::In { property, .. } | Predicate::IsEmpty(property) => {
                ids.insert(property.clone());
            }
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_property_ids(ids);
                }
            }
            Predicate::Not(inner) => inner.collect_property_ids(ids),
            Predicate::Always => {}
        }
    }
}

/// Renders the query-string form accepted by [`crate::parser::parse_predicate`]
impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Comparison { property, operator, value } => {
                write!(f, "{}{}", property, operator)?;
                write_literal(f, value)
            }
            Predicate::In { property, values } => {
                write!(f, "{}.in(", property)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_literal(f, value)?;
                }
                f.write_str(")")
            }
            Predicate::IsEmpty(property) => write!(f, "{}.isEmpty()", property),
            Predicate::And(children) => write_joined(f, children, "&", |p| matches!(p, Predicate::Or(_))),
            Predicate::Or(children) => write_joined(f, children, "|", |p| matches!(p, Predicate::And(_))),
            Predicate::Not(inner) => {
                if inner.is_leaf() {
                    write!(f, "!{}", inner)
                } else {
                    write!(f, "!({})", inner)
                }
            }
            Predicate::Always => f.write_str("<always>"),
        }
    }
}

/// Strings that would not read back as the same string are quoted
fn write_literal(f: &mut std::fmt::Formatter<'_>, value: &Value) -> std::fmt::Result {
    match value {
        Value::String(s) if needs_quotes(s) => {
            f.write_str("\"")?;
            for c in s.chars() {
                if matches!(c, '"' | '\\') {
                    f.write_str("\\")?;
                }
                write!(f, "{}", c)?;
            }
            f.write_str("\"")
        }
        // `{:?}` keeps the decimal point
        Value::F64(float) => write!(f, "{:?}", float),
        other => write!(f, "{}", other),
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.starts_with('=')
        || s.chars().any(|c| c.is_whitespace() || matches!(c, '&' | '|' | '(' | ')' | ',' | '"' | '\\'))
        || !matches!(infer_literal(s), Value::String(_))
}

fn write_joined(
    f: &mut std::fmt::Formatter<'_>,
    children: &[Predicate],
    connector: &str,
    needs_parens: impl Fn(&Predicate) -> bool,
) -> std::fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(connector)?;
        }
        if needs_parens(child) {
            write!(f, "({})", child)?;
        } else {
            write!(f, "{}", child)?;
        }
    }
    Ok(())
}
