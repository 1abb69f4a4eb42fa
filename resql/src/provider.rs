//! Property resolution for resource providers.
//!
//! A provider declares the property ids it can serve. Requested ids are resolved against that set by
//! exact match (including the categories of declared ids), by a declared id that is an ancestor
//! category (map-valued properties whose keys are not known up front), or by a `$N` template.

use crate::ast::Predicate;
use crate::error::{PropertyIdError, ProviderError};
use crate::property::{self, PropertyId, PropertyTemplate};
use crate::resource::{PropertyValue, Resource, ResourceType};
use crate::selection::simplify::PropertySupport;
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// The properties a caller asked for, plus free-form request info and, for writes, property values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    property_ids: IndexSet<PropertyId>,
    request_info: IndexMap<String, String>,
    properties: Vec<IndexMap<PropertyId, Value>>,
}

impl Request {
    /// A request for the given ids; no ids means every declared property
    pub fn new<I, P>(property_ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PropertyId>,
    {
        Self { property_ids: property_ids.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn all() -> Self { Self::default() }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_info.insert(key.into(), value.into());
        self
    }

    /// The same request asking for `property_ids` as well
    pub fn with_property_ids<I, P>(mut self, property_ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PropertyId>,
    {
        self.property_ids.extend(property_ids.into_iter().map(Into::into));
        self
    }

    /// Add one resource's worth of property values, for create and update requests
    pub fn with_properties(mut self, properties: IndexMap<PropertyId, Value>) -> Self {
        self.properties.push(properties);
        self
    }

    pub fn property_ids(&self) -> &IndexSet<PropertyId> { &self.property_ids }

    pub fn request_info(&self) -> &IndexMap<String, String> { &self.request_info }

    pub fn properties(&self) -> &[IndexMap<PropertyId, Value>] { &self.properties }
}

#[derive(Debug, Clone)]
pub struct BaseProvider {
    property_ids: IndexSet<PropertyId>,
    categories: IndexSet<PropertyId>,
    /// declared ids and their categories
    combined_ids: IndexSet<PropertyId>,
    templates: Vec<PropertyTemplate>,
    key_property_ids: IndexMap<ResourceType, PropertyId>,
}

impl BaseProvider {
    pub fn new<I, P>(property_ids: I) -> Result<Self, PropertyIdError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PropertyId>,
    {
        let mut declared = IndexSet::new();
        for id in property_ids {
            let id = id.into();
            if id.is_empty() {
                return Err(PropertyIdError::Empty);
            }
            declared.insert(id);
        }

        let categories: IndexSet<PropertyId> = property::categories(&declared).into_iter().map(PropertyId::from).collect();
        let combined_ids: IndexSet<PropertyId> = declared.iter().chain(categories.iter()).cloned().collect();
        let templates =
            combined_ids.iter().filter(|id| id.has_arguments()).map(PropertyTemplate::parse).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { property_ids: declared, categories, combined_ids, templates, key_property_ids: IndexMap::new() })
    }

    /// Declare the properties identifying a resource, keyed by the resource type each one identifies
    pub fn with_key_property_ids<I, P>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = (ResourceType, P)>,
        P: Into<PropertyId>,
    {
        self.key_property_ids = keys.into_iter().map(|(resource_type, id)| (resource_type, id.into())).collect();
        self
    }

    pub fn key_property_ids(&self) -> &IndexMap<ResourceType, PropertyId> { &self.key_property_ids }

    /// The declared property ids
    pub fn property_ids(&self) -> &IndexSet<PropertyId> { &self.property_ids }

    pub fn categories(&self) -> &IndexSet<PropertyId> { &self.categories }

    pub fn templates(&self) -> &[PropertyTemplate] { &self.templates }

    pub fn is_property_supported(&self, id: &str) -> bool {
        let id = PropertyId::new(id);
        self.combined_ids.contains(&id) || self.has_declared_ancestor(&id) || self.template_for(&id).is_some()
    }

    /// A declared id is an ancestor category of `id`
    fn has_declared_ancestor(&self, id: &PropertyId) -> bool {
        let mut current = id.category();
        while let Some(category) = current {
            if self.property_ids.contains(category) {
                return true;
            }
            current = property::category(category);
        }
        false
    }

    /// The first template matching `id`
    pub fn template_for(&self, id: &str) -> Option<&PropertyTemplate> { self.templates.iter().find(|template| template.is_match(id)) }

    /// The subset of `requested` this provider cannot serve
    pub fn check_property_ids<I, P>(&self, requested: I) -> IndexSet<PropertyId>
    where
        I: IntoIterator<Item = P>,
        P: Into<PropertyId>,
    {
        let unsupported: IndexSet<PropertyId> =
            requested.into_iter().map(Into::into).filter(|id: &PropertyId| !self.is_property_supported(id)).collect();
        if !unsupported.is_empty() {
            debug!("unsupported property ids: {:?}", unsupported);
        }
        unsupported
    }

    /// Ids to populate for a request: every declared id for an empty request, otherwise the requested ids
    /// and the ids the predicate refers to, restricted to the supported ones.
    ///
    /// A category that is only known through the ids below it stands for those declared ids.
    pub fn get_request_property_ids(&self, request: &Request, predicate: Option<&Predicate>) -> IndexSet<PropertyId> {
        if request.property_ids().is_empty() {
            return self.property_ids.clone();
        }
        let mut wanted = request.property_ids().clone();
        if let Some(predicate) = predicate {
            wanted.extend(predicate.property_ids());
        }

        let mut ids = IndexSet::new();
        for id in wanted {
            if self.property_ids.contains(&id) || !self.categories.contains(&id) {
                if self.is_property_supported(&id) {
                    ids.insert(id);
                }
            } else if self.template_for(&id).is_some() {
                ids.insert(id);
            } else {
                ids.extend(self.property_ids.iter().filter(|declared| id.is_category_of(declared)).cloned());
            }
        }
        ids
    }

    /// Capture groups of `id` against the declared template `template_key`; empty if it does not match
    pub fn regex_groups(&self, template_key: &str, id: &str) -> Vec<String> {
        let key = PropertyId::new(template_key);
        let parsed;
        let template = match self.templates.iter().find(|template| template.id() == &key) {
            Some(template) => template,
            None => match PropertyTemplate::parse(&key) {
                Ok(template) => {
                    parsed = template;
                    &parsed
                }
                Err(_) => return Vec::new(),
            },
        };
        template.matches(id).unwrap_or_default()
    }

    /// True when `id` is a template with `$N` capture arguments
    pub fn is_pattern_key(id: &str) -> bool { property::has_arguments(id) }
}

impl PropertySupport for BaseProvider {
    fn is_property_supported(&self, id: &str) -> bool { BaseProvider::is_property_supported(self, id) }
}

/// Whether `id` itself was requested: exactly, through a requested ancestor category, or by a
/// requested template
pub fn is_property_requested(id: &str, requested: &IndexSet<PropertyId>) -> bool {
    let id = PropertyId::new(id);
    if requested.contains(&id) {
        return true;
    }
    let mut current = id.category();
    while let Some(category) = current {
        if requested.contains(category) {
            return true;
        }
        current = property::category(category);
    }
    requested
        .iter()
        .filter(|r| r.has_arguments())
        .any(|r| PropertyTemplate::parse(r).map(|template| template.is_match(&id)).unwrap_or(false))
}

/// Whether some id below `id` was requested
fn is_entry_requested(id: &PropertyId, requested: &IndexSet<PropertyId>) -> bool { requested.iter().any(|r| id.is_category_of(r)) }

/// Write `value` into `resource` under `id` if the caller wants it.
///
/// Requested scalars are set directly. A requested map is expanded into `id/key` entries, recursively,
/// and an empty map is recorded as an empty category. When only ids below `id` were requested, just
/// those entries are written. Returns true if anything was written.
pub fn set_resource_property(
    resource: &mut Resource,
    id: impl Into<PropertyId>,
    value: impl Into<PropertyValue>,
    requested: &IndexSet<PropertyId>,
) -> bool {
    let id = id.into();
    let value = value.into();
    if is_property_requested(&id, requested) {
        write_value(resource, id, value);
        return true;
    }
    match value {
        PropertyValue::Map(entries) if is_entry_requested(&id, requested) => {
            let mut written = false;
            for (key, entry) in entries {
                written |= set_resource_property(resource, PropertyId::join(&id, &key), entry, requested);
            }
            written
        }
        _ => false,
    }
}

fn write_value(resource: &mut Resource, id: PropertyId, value: PropertyValue) {
    match value {
        PropertyValue::Scalar(value) => resource.set_property(id, value),
        PropertyValue::Map(entries) if entries.is_empty() => resource.add_category(id),
        PropertyValue::Map(entries) => {
            for (key, entry) in entries {
                write_value(resource, PropertyId::join(&id, &key), entry);
            }
        }
    }
}

/// A source of resources of one type
pub trait ResourceProvider {
    fn resource_type(&self) -> ResourceType;

    fn base(&self) -> &BaseProvider;

    /// Fetch resources. `predicate` is a single simplified clause the backend may use to narrow its
    /// result, or `None` for everything. Results are filtered again in memory by the caller.
    fn get_resources(&self, request: &Request, predicate: Option<&Predicate>) -> Result<Vec<Resource>, ProviderError>;

    fn create_resources(&self, _request: &Request) -> Result<(), ProviderError> {
        Err(ProviderError::UnsupportedOperation { operation: "create", resource_type: self.resource_type() })
    }

    fn update_resources(&self, _request: &Request, _predicate: Option<&Predicate>) -> Result<(), ProviderError> {
        Err(ProviderError::UnsupportedOperation { operation: "update", resource_type: self.resource_type() })
    }

    fn delete_resources(&self, _predicate: Option<&Predicate>) -> Result<(), ProviderError> {
        Err(ProviderError::UnsupportedOperation { operation: "delete", resource_type: self.resource_type() })
    }

    /// Whether update and delete can apply `predicate` as given. When false the controller first selects
    /// the matching resources and hands over an equality predicate on their key properties instead.
    fn handles_predicate(&self, _predicate: &Predicate) -> bool { true }
}
