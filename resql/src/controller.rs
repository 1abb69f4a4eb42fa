use crate::ast::Predicate;
use crate::error::ProviderError;
use crate::page::{PageRequest, PageResponse};
use crate::property::PropertyId;
use crate::provider::{Request, ResourceProvider};
use crate::resource::{Resource, ResourceType};
use crate::schema::PropertySchema;
use crate::selection::filter::{FilterIterator, FilterResult};
use crate::selection::simplify::simplify;
use crate::selection::sorting::{sort_resources, SortRequest};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

type BoxedProvider = Box<dyn ResourceProvider + Send + Sync>;

/// Routes queries and writes to the registered provider of each resource type.
///
/// A query is checked against the provider's declared properties, simplified into clauses the
/// provider can push down to its backend, fetched clause by clause, and finally filtered in memory
/// with the complete predicate.
#[derive(Default)]
pub struct ClusterController {
    providers: IndexMap<ResourceType, BoxedProvider>,
}

impl ClusterController {
    pub fn new() -> Self { Self::default() }

    /// Register a provider, returning the one it replaces
    pub fn register(&mut self, provider: impl ResourceProvider + Send + Sync + 'static) -> Option<BoxedProvider> {
        self.providers.insert(provider.resource_type(), Box::new(provider))
    }

    pub fn provider(&self, resource_type: ResourceType) -> Result<&(dyn ResourceProvider + Send + Sync), ProviderError> {
        self.providers.get(&resource_type).map(|provider| provider.as_ref()).ok_or(ProviderError::NoProvider(resource_type))
    }

    pub fn get_resources(
        &self,
        resource_type: ResourceType,
        request: &Request,
        predicate: Option<&Predicate>,
    ) -> Result<Vec<Resource>, ProviderError> {
        self.query(resource_type, request, predicate, &[])
    }

    /// Like [`get_resources`](Self::get_resources), then sorted and cut to one page
    pub fn get_page(
        &self,
        resource_type: ResourceType,
        request: &Request,
        predicate: Option<&Predicate>,
        page: Option<&PageRequest>,
        sort: Option<&SortRequest>,
    ) -> Result<PageResponse, ProviderError> {
        let sort_ids: Vec<PropertyId> = sort.map(|sort| sort.property_ids().cloned().collect()).unwrap_or_default();
        let mut resources = self.query(resource_type, request, predicate, &sort_ids)?;
        if let Some(sort) = sort {
            sort_resources(&mut resources, sort);
        }
        Ok(match page {
            Some(page) => page.apply(resources),
            None => PageResponse::whole(resources),
        })
    }

    pub fn create_resources(&self, resource_type: ResourceType, request: &Request) -> Result<(), ProviderError> {
        let provider = self.provider(resource_type)?;
        check_supported(provider, resource_type, write_ids(request))?;
        provider.create_resources(request)
    }

    /// Update the resources matching `predicate` with the property values of `request`
    pub fn update_resources(
        &self,
        resource_type: ResourceType,
        request: &Request,
        predicate: Option<&Predicate>,
    ) -> Result<(), ProviderError> {
        let provider = self.provider(resource_type)?;
        let mut referenced = write_ids(request);
        referenced.extend(predicate.map(Predicate::property_ids).unwrap_or_default());
        check_supported(provider, resource_type, referenced)?;

        match self.resolve_predicate(resource_type, predicate)? {
            Resolved::Unchanged => provider.update_resources(request, predicate),
            Resolved::Keys(keys) => provider.update_resources(request, Some(&keys)),
            Resolved::NoMatch => Ok(()),
        }
    }

    pub fn delete_resources(&self, resource_type: ResourceType, predicate: Option<&Predicate>) -> Result<(), ProviderError> {
        let provider = self.provider(resource_type)?;
        check_supported(provider, resource_type, predicate.map(Predicate::property_ids).unwrap_or_default())?;

        match self.resolve_predicate(resource_type, predicate)? {
            Resolved::Unchanged => provider.delete_resources(predicate),
            Resolved::Keys(keys) => provider.delete_resources(Some(&keys)),
            Resolved::NoMatch => Ok(()),
        }
    }

    /// Turn a predicate the provider cannot apply into key equalities of the resources it selects
    fn resolve_predicate(&self, resource_type: ResourceType, predicate: Option<&Predicate>) -> Result<Resolved, ProviderError> {
        let provider = self.provider(resource_type)?;
        let Some(predicate) = predicate else {
            return Ok(Resolved::Unchanged);
        };
        let keys: Vec<PropertyId> = provider.base().key_property_ids().values().cloned().collect();
        if keys.is_empty() || provider.handles_predicate(predicate) {
            return Ok(Resolved::Unchanged);
        }

        let resources = self.query(resource_type, &Request::new(keys.iter().cloned()), Some(predicate), &[])?;
        let alternatives = resources.iter().filter_map(|resource| {
            Predicate::conjunction(keys.iter().filter_map(|key| resource.get(key).map(|value| Predicate::equals(key, value.clone()))))
        });
        match Predicate::disjunction(alternatives) {
            Some(resolved) => {
                debug!("resolved {} for {} resources to {}", predicate, resource_type, resolved);
                Ok(Resolved::Keys(resolved))
            }
            None => {
                debug!("nothing matches {} for {} resources", predicate, resource_type);
                Ok(Resolved::NoMatch)
            }
        }
    }

    /// Check, fetch clause by clause, de-duplicate, and filter. `also_fetch` names ids the caller needs
    /// populated beyond the request, e.g. sort keys.
    fn query(
        &self,
        resource_type: ResourceType,
        request: &Request,
        predicate: Option<&Predicate>,
        also_fetch: &[PropertyId],
    ) -> Result<Vec<Resource>, ProviderError> {
        let provider = self.provider(resource_type)?;
        let base = provider.base();

        let mut referenced = request.property_ids().clone();
        referenced.extend(also_fetch.iter().cloned());
        if let Some(predicate) = predicate {
            referenced.extend(predicate.property_ids());
        }
        check_supported(provider, resource_type, referenced.iter().cloned())?;

        // an empty request already populates everything
        let fetch_request;
        let request = if request.property_ids().is_empty() {
            request
        } else {
            let keys = base.key_property_ids().values().cloned();
            fetch_request = request.clone().with_property_ids(referenced.into_iter().chain(keys));
            &fetch_request
        };

        let keys: Vec<&PropertyId> = base.key_property_ids().values().collect();
        let clauses = predicate.map(|predicate| simplify(predicate, base)).unwrap_or_default();
        let mut fetched: Vec<Resource> = Vec::new();
        if clauses.is_empty() {
            debug!("fetching {} resources unfiltered", resource_type);
            fetched = provider.get_resources(request, None)?;
        } else {
            for clause in &clauses {
                debug!("fetching {} resources where {}", resource_type, clause);
                for resource in provider.get_resources(request, Some(clause))? {
                    if !fetched.iter().any(|seen| same_resource(seen, &resource, &keys)) {
                        fetched.push(resource);
                    }
                }
            }
        }

        let mut resources = Vec::with_capacity(fetched.len());
        for result in FilterIterator::new(fetched.into_iter(), predicate.cloned()) {
            match result {
                FilterResult::Pass(resource) => resources.push(resource),
                FilterResult::Skip(_) => {}
                FilterResult::Error(_, e) => return Err(e.into()),
            }
        }
        trace!("{} {} resource(s) matched", resources.len(), resource_type);
        Ok(resources)
    }
}

enum Resolved {
    Unchanged,
    Keys(Predicate),
    /// no resource matches, so the provider is not called
    NoMatch,
}

fn check_supported(
    provider: &(dyn ResourceProvider + Send + Sync),
    resource_type: ResourceType,
    ids: impl IntoIterator<Item = PropertyId>,
) -> Result<(), ProviderError> {
    let unsupported = provider.base().check_property_ids(ids);
    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::UnsupportedProperties { resource_type, property_ids: unsupported })
    }
}

/// Requested ids plus every id a write sets
fn write_ids(request: &Request) -> IndexSet<PropertyId> {
    let mut ids = request.property_ids().clone();
    for properties in request.properties() {
        ids.extend(properties.keys().cloned());
    }
    ids
}

/// Two fetched rows are the same resource when they agree on every key property. Without declared
/// keys, or when a row lacks one, only identical rows are.
fn same_resource(a: &Resource, b: &Resource, keys: &[&PropertyId]) -> bool {
    if keys.is_empty() || keys.iter().any(|key| a.get(key).is_none() || b.get(key).is_none()) {
        return a == b;
    }
    a.resource_type() == b.resource_type() && keys.iter().all(|key| a.get(key) == b.get(key))
}

/// Combine equalities on the key properties of `resource_type` with a caller predicate.
///
/// `key_values` maps the resource type each key identifies (e.g. `Cluster` for a host's cluster name)
/// to its value. Keys the schema does not declare are ignored. `None` when there is nothing to filter on.
pub fn key_predicate(
    schema: &PropertySchema,
    resource_type: ResourceType,
    key_values: &IndexMap<ResourceType, Value>,
    predicate: Option<Predicate>,
) -> Option<Predicate> {
    let mut parts = Vec::new();
    if let Some(keys) = schema.key_property_ids(resource_type) {
        for (key_type, value) in key_values {
            if let Some(id) = keys.get(key_type) {
                parts.push(Predicate::equals(id, value.clone()));
            }
        }
    }
    parts.extend(predicate);
    Predicate::conjunction(parts)
}
