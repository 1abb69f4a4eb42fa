mod common;

use anyhow::Result;
use common::{declared_provider, ids};
use resql::{set_resource_property, BaseProvider, Predicate, PropertyValue, Request, Resource, ResourceType, Value};

#[test]
fn test_check_property_ids() {
    let provider = declared_provider();
    assert!(provider.check_property_ids(["foo"]).is_empty());
    assert!(provider.check_property_ids(["cat5/subcat5/map/key"]).is_empty());
    assert!(provider.check_property_ids(["cat1/foo"]).is_empty());
    assert!(provider.check_property_ids(["cat1"]).is_empty());

    let unsupported = provider.check_property_ids(["bar"]);
    assert_eq!(unsupported.len(), 1);
    assert!(unsupported.contains("bar"));
}

#[test]
fn test_declared_ids_are_kept() {
    let declared = ["p1", "foo", "cat1/foo", "cat2/bar", "cat2/baz", "cat3/sub1/bam", "cat4/sub2/sub3/bat"];
    let provider = BaseProvider::new(declared).unwrap();
    assert!(declared.iter().all(|id| provider.property_ids().contains(*id)));
    assert!(provider.categories().contains("cat4/sub2"));
    assert!(!provider.property_ids().contains("cat4/sub2"));
}

#[test]
fn test_request_property_ids() {
    let provider = declared_provider();
    let request = Request::new(["cat2", "cat5/subcat5/map/key", "nope"]).with_info("fields", "cat2,nope");
    let predicate = Predicate::equals("foo", "x");
    let requested = provider.get_request_property_ids(&request, Some(&predicate));
    // a category known only through its children stands for the declared ids below it
    assert_eq!(requested, ids(&["cat2/bar", "cat2/baz", "cat5/subcat5/map/key", "foo"]));
    assert_eq!(request.request_info().get("fields").map(String::as_str), Some("cat2,nope"));
}

#[test]
fn test_populate_from_backend_row() -> Result<()> {
    let provider = declared_provider();
    let request = Request::new(["cat2", "cat5/subcat5/map/key"]);
    let requested = provider.get_request_property_ids(&request, None);

    let mut resource = Resource::new(ResourceType::Service);
    assert!(!set_resource_property(&mut resource, "foo", "f", &requested));
    assert!(set_resource_property(&mut resource, "cat2/bar", 1, &requested));
    assert!(set_resource_property(&mut resource, "cat2/baz", 2, &requested));
    let map = PropertyValue::map([("key", "k"), ("other", "o")]);
    assert!(set_resource_property(&mut resource, "cat5/subcat5/map", map, &requested));

    let stored: Vec<String> = resource.property_ids().map(String::from).collect();
    assert_eq!(stored, vec!["cat2/bar", "cat2/baz", "cat5/subcat5/map/key"]);
    assert_eq!(resource.get("cat5/subcat5/map/key"), Some(&Value::from("k")));
    Ok(())
}

#[test]
fn test_map_expansion() {
    let mut resource = Resource::new(ResourceType::Cluster);
    let value = PropertyValue::map([("key1", "v1"), ("key2", "v2")]);
    set_resource_property(&mut resource, "cat1/mapProperty", value, &ids(&["cat1/mapProperty"]));

    assert_eq!(resource.get("cat1/mapProperty/key1"), Some(&Value::from("v1")));
    assert_eq!(resource.get("cat1/mapProperty/key2"), Some(&Value::from("v2")));
    assert_eq!(resource.get("cat1/mapProperty"), None);
}

#[test]
fn test_empty_map_marks_category() {
    let mut resource = Resource::new(ResourceType::Cluster);
    let empty = PropertyValue::Map(Default::default());
    assert!(set_resource_property(&mut resource, "cat1/mapProperty", empty, &ids(&["cat1"])));
    assert_eq!(resource.category_len("cat1/mapProperty"), Some(0));
    assert!(resource.category("cat1/mapProperty").is_some());
}
