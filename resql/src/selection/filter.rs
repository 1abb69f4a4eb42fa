//! Filter resources based on a predicate. This is necessary for cases where a provider returned a set of resources
//! which has not been fully pre-filtered by its backend - or to validate a backend filter with the complete predicate.

use crate::ast::{ComparisonOperator, Predicate};
use crate::error::EvaluationError;
use crate::resource::{Resource, ResourceType};
use crate::value::Value;
use std::cmp::Ordering;

pub trait Filterable {
    fn resource_type(&self) -> ResourceType;
    fn value(&self, property_id: &str) -> Option<Value>;
    /// Number of entries in a category, `None` if the category is absent
    fn category_len(&self, _category: &str) -> Option<usize> { None }
}

impl Filterable for Resource {
    fn resource_type(&self) -> ResourceType { Resource::resource_type(self) }
    fn value(&self, property_id: &str) -> Option<Value> { self.get(property_id).cloned() }
    fn category_len(&self, category: &str) -> Option<usize> { Resource::category_len(self, category) }
}

impl<T: Filterable> Filterable for &T {
    fn resource_type(&self) -> ResourceType { (**self).resource_type() }
    fn value(&self, property_id: &str) -> Option<Value> { (**self).value(property_id) }
    fn category_len(&self, category: &str) -> Option<usize> { (**self).category_len(category) }
}

fn evaluate_comparison(
    actual: Option<Value>,
    property: &crate::property::PropertyId,
    operator: ComparisonOperator,
    literal: &Value,
) -> Result<bool, EvaluationError> {
    // An absent property never satisfies a comparison, except "not equal"
    let Some(actual) = actual else {
        return Ok(operator == ComparisonOperator::NotEqual);
    };

    let ordering = actual.compare_with(literal);
    Ok(match (operator, ordering) {
        (ComparisonOperator::Equal, ordering) => ordering == Some(Ordering::Equal),
        (ComparisonOperator::NotEqual, ordering) => ordering != Some(Ordering::Equal),
        (_, None) => {
            return Err(EvaluationError::TypeMismatch {
                property: property.clone(),
                operator,
                actual: actual.value_type(),
                literal: literal.value_type(),
            });
        }
        (ComparisonOperator::GreaterThan, Some(o)) => o == Ordering::Greater,
        (ComparisonOperator::GreaterThanOrEqual, Some(o)) => o != Ordering::Less,
        (ComparisonOperator::LessThan, Some(o)) => o == Ordering::Less,
        (ComparisonOperator::LessThanOrEqual, Some(o)) => o != Ordering::Greater,
    })
}

pub fn evaluate_predicate<R: Filterable>(record: &R, predicate: &Predicate) -> Result<bool, EvaluationError> {
    match predicate {
        Predicate::Comparison { property, operator, value } => evaluate_comparison(record.value(property), property, *operator, value),
        Predicate::In { property, values } => Ok(match record.value(property) {
            Some(actual) => values.iter().any(|v| actual.compare_with(v) == Some(Ordering::Equal)),
            None => false,
        }),
        Predicate::IsEmpty(category) => Ok(match record.value(category) {
            // a scalar stored under the id is not an empty category
            Some(_) => false,
            None => record.category_len(category).unwrap_or(0) == 0,
        }),
        Predicate::And(children) => {
            for child in children {
                if !evaluate_predicate(record, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Or(children) => {
            for child in children {
                if evaluate_predicate(record, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Not(pred) => Ok(!evaluate_predicate(record, pred)?),
        Predicate::Always => Ok(true),
    }
}

/// Evaluate an optional predicate; no predicate matches everything
pub fn evaluate<R: Filterable>(predicate: Option<&Predicate>, record: &R) -> Result<bool, EvaluationError> {
    match predicate {
        Some(predicate) => evaluate_predicate(record, predicate),
        None => Ok(true),
    }
}

#[derive(Debug, PartialEq)]
pub enum FilterResult<R> {
    Pass(R),
    Skip(R),
    Error(R, EvaluationError),
}

pub struct FilterIterator<I> {
    iter: I,
    predicate: Option<Predicate>,
}

impl<I, R> FilterIterator<I>
where
    I: Iterator<Item = R>,
    R: Filterable,
{
    pub fn new(iter: I, predicate: Option<Predicate>) -> Self { Self { iter, predicate } }
}

impl<I, R> Iterator for FilterIterator<I>
where
    I: Iterator<Item = R>,
    R: Filterable,
{
    type Item = FilterResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|record| match evaluate(self.predicate.as_ref(), &record) {
            Ok(true) => FilterResult::Pass(record),
            Ok(false) => FilterResult::Skip(record),
            Err(e) => FilterResult::Error(record, e),
        })
    }
}
