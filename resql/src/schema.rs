use crate::error::ConfigError;
use crate::property::PropertyId;
use crate::provider::BaseProvider;
use crate::resource::ResourceType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declared property ids per resource type, and the key properties that identify a resource.
///
/// ```json
/// {
///   "properties": { "Host": ["Hosts/cluster_name", "Hosts/host_name", "Hosts/cpu_count"] },
///   "key_properties": { "Host": { "Cluster": "Hosts/cluster_name", "Host": "Hosts/host_name" } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub properties: IndexMap<ResourceType, Vec<PropertyId>>,
    #[serde(default)]
    pub key_properties: IndexMap<ResourceType, IndexMap<ResourceType, PropertyId>>,
}

impl PropertySchema {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> { Ok(serde_json::from_str(json)?) }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, ConfigError> { Ok(serde_json::from_reader(reader)?) }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn property_ids(&self, resource_type: ResourceType) -> Option<&[PropertyId]> { self.properties.get(&resource_type).map(Vec::as_slice) }

    /// Key property ids of a resource type, keyed by the resource type each one identifies
    pub fn key_property_ids(&self, resource_type: ResourceType) -> Option<&IndexMap<ResourceType, PropertyId>> {
        self.key_properties.get(&resource_type)
    }

    /// A [`BaseProvider`] over the properties and key properties declared for `resource_type`
    pub fn provider(&self, resource_type: ResourceType) -> Result<BaseProvider, ConfigError> {
        let ids = self.property_ids(resource_type).ok_or(ConfigError::UnknownResourceType(resource_type))?;
        let keys = self.key_property_ids(resource_type).cloned().unwrap_or_default();
        Ok(BaseProvider::new(ids)?.with_key_property_ids(keys))
    }
}
