//! The generic resource model: a typed, ordered category -> property -> value store.

use crate::property::PropertyId;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Cluster,
    Service,
    Host,
    Component,
    HostComponent,
    Configuration,
    ConfigGroup,
    Action,
    Request,
    RequestSchedule,
    Task,
    User,
    Group,
    Stack,
    StackVersion,
    Mpack,
    Upgrade,
    AlertDefinition,
    AlertGroup,
    AlertTarget,
    ViewInstance,
    Blueprint,
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:?}", self) }
}

/// A value of unknown shape handed to a provider: a scalar or a (possibly nested) map
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(Value),
    Map(IndexMap<String, PropertyValue>),
}

macro_rules! scalar_property_value {
    ($($t:ty),*) => {
        $(impl From<$t> for PropertyValue {
            fn from(value: $t) -> Self { PropertyValue::Scalar(value.into()) }
        })*
    };
}

scalar_property_value!(Value, bool, i32, i64, u32, f64, &str, String, &String);

impl PropertyValue {
    pub fn map<K: Into<String>, V: Into<PropertyValue>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        PropertyValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    resource_type: ResourceType,
    /// category -> leaf name -> value; root-level properties live under ""
    properties: IndexMap<String, IndexMap<String, Value>>,
}

impl Resource {
    pub fn new(resource_type: ResourceType) -> Self { Self { resource_type, properties: IndexMap::new() } }

    pub fn resource_type(&self) -> ResourceType { self.resource_type }

    pub fn set_property(&mut self, id: impl Into<PropertyId>, value: impl Into<Value>) {
        let id = id.into();
        let category = id.category().unwrap_or("").to_string();
        self.properties.entry(category).or_default().insert(id.name().to_string(), value.into());
    }

    /// Record that a category exists even if it holds no properties
    pub fn add_category(&mut self, category: impl Into<PropertyId>) {
        let category = category.into();
        self.properties.entry(category.as_str().to_string()).or_default();
    }

    /// Look up a property by its full id
    pub fn get(&self, id: &str) -> Option<&Value> {
        let id = PropertyId::new(id);
        self.properties.get(id.category().unwrap_or(""))?.get(id.name())
    }

    pub fn remove_property(&mut self, id: &str) -> Option<Value> {
        let id = PropertyId::new(id);
        self.properties.get_mut(id.category().unwrap_or(""))?.shift_remove(id.name())
    }

    pub fn category(&self, category: &str) -> Option<&IndexMap<String, Value>> { self.properties.get(category) }

    pub fn properties(&self) -> &IndexMap<String, IndexMap<String, Value>> { &self.properties }

    /// Full ids of every stored property, in insertion order
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.properties.iter().flat_map(|(category, props)| props.keys().map(move |name| PropertyId::join(category, name)))
    }

    /// Number of entries in a category, counting entries of nested sub-categories
    pub fn category_len(&self, category: &str) -> Option<usize> {
        let category = PropertyId::new(category);
        let mut found = false;
        let mut len = 0;
        for (name, props) in &self.properties {
            if name == category.as_str() || category.is_category_of(name) {
                found = true;
                len += props.len();
            }
        }
        found.then_some(len)
    }
}
