use crate::ast::ComparisonOperator;
use crate::grammar;
use crate::property::PropertyId;
use crate::resource::ResourceType;
use crate::value::ValueType;
use indexmap::IndexSet;
use thiserror::Error;

/// Misuse of a predicate builder (unbalanced grouping, nothing to build)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("{0} group(s) left open")]
    UnbalancedGroup(usize),
    #[error("end() called without a matching begin()")]
    UnexpectedEnd,
    #[error("connector with no predicate following it")]
    DanglingConnector,
    #[error("no predicate to build")]
    NoPredicate,
}

/// Errors raised while evaluating a predicate against a resource
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvaluationError {
    #[error("cannot apply {operator} to {property}: {actual:?} is not comparable with {literal:?}")]
    TypeMismatch { property: PropertyId, operator: ComparisonOperator, actual: ValueType, literal: ValueType },
}

/// Custom error type for query-string parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    SyntaxError(String),
    #[error("Empty expression")]
    EmptyExpression,
    #[error("Expected {expected}, got {got:?}")]
    UnexpectedRule { expected: &'static str, got: grammar::Rule },
    #[error("Invalid property id: {0}")]
    InvalidPropertyId(#[from] PropertyIdError),
    #[error("Missing {0} operand")]
    MissingOperand(&'static str),
}

impl From<pest::error::Error<grammar::Rule>> for ParseError {
    fn from(err: pest::error::Error<grammar::Rule>) -> Self { ParseError::SyntaxError(err.to_string()) }
}

/// Malformed property id or template
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropertyIdError {
    #[error("empty property id")]
    Empty,
    #[error("unsupported capture transform `{directive}` in {id}")]
    UnsupportedTransform { id: String, directive: String },
    #[error("invalid capture index in {0}")]
    InvalidCapture(String),
    #[error("template {id} did not compile: {message}")]
    Pattern { id: String, message: String },
}

/// Errors loading a property schema
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse schema: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no properties declared for {0}")]
    UnknownResourceType(ResourceType),
    #[error(transparent)]
    PropertyId(#[from] PropertyIdError),
}

/// Errors surfaced by resource providers and the controller that drives them
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{operation} is not supported for {resource_type} resources")]
    UnsupportedOperation { operation: &'static str, resource_type: ResourceType },
    #[error("unsupported properties for {resource_type}: {}", format_ids(.property_ids))]
    UnsupportedProperties { resource_type: ResourceType, property_ids: IndexSet<PropertyId> },
    #[error("no provider registered for {0}")]
    NoProvider(ResourceType),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("backend failure: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),
}

fn format_ids(ids: &IndexSet<PropertyId>) -> String { ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ") }
