mod common;

use anyhow::Result;
use resql::error::ParseError;
use resql::{evaluate_predicate, parse_predicate, ComparisonOperator, Predicate, Value};

#[test]
fn test_try_from() -> Result<()> {
    let predicate = Predicate::try_from("Hosts/host_name=h1&Hosts/cpu_count>2")?;
    assert_eq!(
        predicate,
        Predicate::And(vec![
            Predicate::equals("Hosts/host_name", "h1"),
            Predicate::comparison("Hosts/cpu_count", ComparisonOperator::GreaterThan, 2),
        ])
    );
    let parsed: Predicate = "a<=1.5".parse()?;
    assert_eq!(parsed, Predicate::comparison("a", ComparisonOperator::LessThanOrEqual, 1.5));
    Ok(())
}

#[test]
fn test_evaluates_against_hosts() -> Result<()> {
    let h1 = common::host("h1", 4, "/r1");
    let h2 = common::host("h2", 16, "/r2");

    let predicate = parse_predicate("Hosts/rack_info.in(/r1,/r3)|Hosts/cpu_count>=16")?;
    assert!(evaluate_predicate(&h1, &predicate)?);
    assert!(evaluate_predicate(&h2, &predicate)?);

    let predicate = parse_predicate("!(Hosts/host_name=h1|Hosts/host_name=h3) & Hosts/cpu_count<20")?;
    assert!(!evaluate_predicate(&h1, &predicate)?);
    assert!(evaluate_predicate(&h2, &predicate)?);
    Ok(())
}

#[test]
fn test_literal_types() -> Result<()> {
    let cases = [("a=12", Value::I64(12)), ("a=1.25", Value::F64(1.25)), ("a=false", Value::Bool(false)), ("a=HEALTHY", Value::from("HEALTHY"))];
    for (input, expected) in cases {
        match parse_predicate(input)? {
            Predicate::Comparison { value, .. } => {
                assert_eq!(value.value_type(), expected.value_type(), "{}", input);
                assert_eq!(value, expected);
            }
            other => panic!("{} parsed as {:?}", input, other),
        }
    }
    Ok(())
}

#[test]
fn test_syntax_errors() {
    for input in ["", "a", "a=1|", "(a=1", "a=1)", "a.isEmpty(x)"] {
        assert!(matches!(parse_predicate(input), Err(ParseError::SyntaxError(_))), "{}", input);
    }
}
