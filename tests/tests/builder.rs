mod common;

use anyhow::Result;
use resql::error::BuildError;
use resql::{evaluate_predicate, Predicate, PredicateBuilder, Resource, ResourceType};

fn resource() -> Resource {
    let mut resource = Resource::new(ResourceType::Cluster);
    resource.set_property("cat1/prop1", "foo");
    resource.set_property("cat1/prop2", "bar");
    resource.set_property("cat1/prop3", "cat");
    resource
}

fn check(predicate: Predicate, expected: bool) -> Result<()> {
    assert_eq!(evaluate_predicate(&resource(), &predicate)?, expected, "{}", predicate);
    Ok(())
}

#[test]
fn test_round_trip() -> Result<()> {
    let predicate = PredicateBuilder::new().property("a").equals(1).and().property("b").equals(2).to_predicate()?;
    assert_eq!(predicate, Predicate::And(vec![Predicate::equals("a", 1), Predicate::equals("b", 2)]));

    let mut matching = Resource::new(ResourceType::Cluster);
    matching.set_property("a", 1);
    matching.set_property("b", 2);
    assert!(evaluate_predicate(&matching, &predicate)?);

    let mut other = Resource::new(ResourceType::Cluster);
    other.set_property("a", 1);
    other.set_property("b", 3);
    assert!(!evaluate_predicate(&other, &predicate)?);
    Ok(())
}

#[test]
fn test_simple_and_not() -> Result<()> {
    check(PredicateBuilder::new().property("cat1/prop1").equals("foo").to_predicate()?, true)?;
    check(PredicateBuilder::new().property("cat1/prop1").equals("bar").to_predicate()?, false)?;
    check(PredicateBuilder::new().not().property("cat1/prop1").equals("foo").to_predicate()?, false)?;
    check(PredicateBuilder::new().not().property("cat1/prop1").equals("bar").to_predicate()?, true)?;
    check(PredicateBuilder::new().property("cat1/prop1").equals("foo").and().not().property("cat1/prop2").equals("bar").to_predicate()?, false)?;
    check(PredicateBuilder::new().property("cat1/prop1").equals("foo").and().not().property("cat1/prop2").equals("car").to_predicate()?, true)?;
    Ok(())
}

#[test]
fn test_and_or() -> Result<()> {
    let build = |p2: &str, p3: &str| {
        PredicateBuilder::new()
            .property("cat1/prop1")
            .equals("foo")
            .and()
            .property("cat1/prop2")
            .equals(p2)
            .or()
            .property("cat1/prop3")
            .equals(p3)
            .to_predicate()
    };
    check(build("bar", "cat")?, true)?;
    check(build("car", "cat")?, true)?;
    check(build("bar", "can")?, true)?;
    check(build("bat", "can")?, false)?;
    Ok(())
}

#[test]
fn test_long_or() -> Result<()> {
    let predicate = PredicateBuilder::new()
        .property("cat1/prop1")
        .equals("fun")
        .or()
        .property("cat1/prop2")
        .equals("car")
        .or()
        .property("cat1/prop3")
        .equals("bat")
        .to_predicate()?;
    assert!(matches!(&predicate, Predicate::Or(children) if children.len() == 3));
    check(predicate, false)
}

#[test]
fn test_blocks() -> Result<()> {
    // (p1 == foo && p2 == bat) || p3 == cat
    let predicate = PredicateBuilder::new()
        .begin()
        .property("cat1/prop1")
        .equals("foo")
        .and()
        .property("cat1/prop2")
        .equals("bat")
        .end()
        .or()
        .property("cat1/prop3")
        .equals("cat")
        .to_predicate()?;
    check(predicate, true)?;

    // p1 == foo && !(p2 == bar || p3 == cat)
    let predicate = PredicateBuilder::new()
        .property("cat1/prop1")
        .equals("foo")
        .and()
        .not()
        .begin()
        .property("cat1/prop2")
        .equals("bar")
        .or()
        .property("cat1/prop3")
        .equals("cat")
        .end()
        .to_predicate()?;
    check(predicate, false)
}

#[test]
fn test_nested_blocks() -> Result<()> {
    // p1 == foo && (p2 == bat || (p3 == cat && p2 == bar))
    let predicate = PredicateBuilder::new()
        .property("cat1/prop1")
        .equals("foo")
        .and()
        .begin()
        .property("cat1/prop2")
        .equals("bat")
        .or()
        .begin()
        .property("cat1/prop3")
        .equals("cat")
        .and()
        .property("cat1/prop2")
        .equals("bar")
        .end()
        .end()
        .to_predicate()?;
    assert_eq!(predicate.to_string(), "cat1/prop1=foo&(cat1/prop2=bat|(cat1/prop3=cat&cat1/prop2=bar))");
    check(predicate, true)
}

#[test]
fn test_unbalanced_blocks() {
    let result = PredicateBuilder::new().begin().property("cat1/prop1").equals("foo").to_predicate();
    assert_eq!(result, Err(BuildError::UnbalancedGroup(1)));

    let result = PredicateBuilder::new().property("cat1/prop1").equals("foo").end().to_predicate();
    assert_eq!(result, Err(BuildError::UnexpectedEnd));
}
