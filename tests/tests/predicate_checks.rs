//! Predicate Checks: query-string predicates evaluated against in-memory resources, with and without the
//! simplify/re-filter round trip the controller performs.
//!
//! Test cases loaded from `tests/predicate_cases.json`.

mod common;

use anyhow::{anyhow, Result};
use resql::{evaluate_predicate, parse_predicate, simplify, Predicate, PropertyId, Resource, ResourceType, Value};
use serde::Deserialize;
use std::collections::BTreeMap;

const PREDICATE_CASES_JSON: &str = include_str!("../predicate_cases.json");

#[derive(Debug, Deserialize)]
struct PredicateCases {
    suites: Vec<TestSuite>,
}
#[derive(Debug, Deserialize)]
struct TestSuite {
    name: String,
    cases: Vec<TestCase>,
}
#[derive(Debug, Deserialize)]
struct TestCase {
    name: String,
    resources: Vec<TestResource>,
    expectations: Vec<Expectation>,
}
#[derive(Debug, Deserialize)]
struct TestResource {
    label: String,
    properties: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    categories: Vec<String>,
}
#[derive(Debug, Deserialize)]
struct Expectation {
    query: String,
    matches: Vec<String>,
}

fn all_suites() -> Result<Vec<TestSuite>> {
    let cases: PredicateCases = serde_json::from_str(PREDICATE_CASES_JSON)?;
    Ok(cases.suites)
}

fn to_value(json: &serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::I64(i),
            None => Value::F64(n.as_f64().ok_or_else(|| anyhow!("unrepresentable number {}", n))?),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        other => return Err(anyhow!("unsupported property value {}", other)),
    })
}

fn build(resource: &TestResource) -> Result<Resource> {
    let mut built = Resource::new(ResourceType::Host);
    for category in &resource.categories {
        built.add_category(category);
    }
    for (id, value) in &resource.properties {
        built.set_property(id, to_value(value)?);
    }
    Ok(built)
}

fn matching(resources: &[(String, Resource)], predicate: &Predicate) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    for (label, resource) in resources {
        if evaluate_predicate(resource, predicate)? {
            labels.push(label.clone());
        }
    }
    Ok(labels)
}

#[test]
fn test_predicate_cases() -> Result<()> {
    for suite in all_suites()? {
        for case in &suite.cases {
            let resources = case.resources.iter().map(|r| Ok((r.label.clone(), build(r)?))).collect::<Result<Vec<_>>>()?;
            for expectation in &case.expectations {
                let predicate = parse_predicate(&expectation.query).map_err(|e| anyhow!("{}: {}", expectation.query, e))?;
                let got = matching(&resources, &predicate)?;
                assert_eq!(got, expectation.matches, "{} / {}: {}", suite.name, case.name, expectation.query);
            }
        }
    }
    Ok(())
}

/// With every referenced property supported, the OR of the simplified clauses selects the same resources
#[test]
fn test_simplified_clauses_agree() -> Result<()> {
    for suite in all_suites()? {
        for case in &suite.cases {
            let resources = case.resources.iter().map(|r| Ok((r.label.clone(), build(r)?))).collect::<Result<Vec<_>>>()?;
            for expectation in &case.expectations {
                let predicate = parse_predicate(&expectation.query)?;
                let supported: indexmap::IndexSet<PropertyId> = predicate.property_ids();
                let clauses = simplify(&predicate, &supported);
                let Some(rebuilt) = Predicate::disjunction(clauses) else {
                    panic!("{} simplified to nothing", expectation.query);
                };
                assert_eq!(matching(&resources, &rebuilt)?, expectation.matches, "{}", rebuilt);
            }
        }
    }
    Ok(())
}
