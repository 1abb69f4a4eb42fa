pub mod ast;
pub mod builder;
pub mod controller;
mod conversion;
pub mod error;
pub mod grammar;
pub mod page;
pub mod parser;
pub mod property;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod selection;
pub mod value;

pub use ast::{ComparisonOperator, Predicate};
pub use builder::PredicateBuilder;
pub use controller::{key_predicate, ClusterController};
pub use page::{PageRequest, PageResponse, StartingPoint};
pub use parser::parse_predicate;
pub use property::{PropertyId, PropertyTemplate};
pub use provider::{is_property_requested, set_resource_property, BaseProvider, Request, ResourceProvider};
pub use resource::{PropertyValue, Resource, ResourceType};
pub use schema::PropertySchema;
pub use selection::filter::{evaluate, evaluate_predicate, Filterable};
pub use selection::simplify::{simplify, PropertySupport};
pub use selection::sorting::{sort_resources, SortField, SortOrder, SortRequest};
pub use value::Value;
