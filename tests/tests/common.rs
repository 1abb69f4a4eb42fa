#![allow(unused)]

use indexmap::IndexSet;
use resql::{BaseProvider, PropertyId, Resource, ResourceType};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() { tracing_subscriber::fmt().with_max_level(Level::DEBUG).with_test_writer().init(); }

/// Property ids of the provider used throughout the resolver tests
pub const DECLARED: [&str; 7] = ["foo", "cat1/foo", "cat2/bar", "cat2/baz", "cat3/sub1/bam", "cat4/sub2/sub3/bat", "cat5/subcat5/map"];

pub fn declared_provider() -> BaseProvider { BaseProvider::new(DECLARED).expect("declared ids are valid") }

pub fn ids(ids: &[&str]) -> IndexSet<PropertyId> { ids.iter().map(|id| PropertyId::new(id)).collect() }

pub fn host(name: &str, cpu_count: i64, rack: &str) -> Resource {
    let mut resource = Resource::new(ResourceType::Host);
    resource.set_property("Hosts/host_name", name);
    resource.set_property("Hosts/cpu_count", cpu_count);
    resource.set_property("Hosts/rack_info", rack);
    resource
}

/// A resource with the given `category/prop` values, for predicates over single-letter properties
pub fn record(values: &[(&str, i64)]) -> Resource {
    let mut resource = Resource::new(ResourceType::Cluster);
    for (id, value) in values {
        resource.set_property(*id, *value);
    }
    resource
}
