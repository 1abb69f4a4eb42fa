use crate::ast::{ComparisonOperator, Predicate};
use crate::error::ParseError;
use crate::grammar::{self, QueryParser, Rule};
use crate::property::PropertyId;
use crate::value::Value;
use pest::iterators::Pair;
use pest::Parser;

/// Print a parse tree node and its children recursively
#[cfg(test)]
fn print_tree(pair: Pair<Rule>, indent: usize) {
    if matches!(pair.as_rule(), Rule::EOI) {
        return;
    }
    println!("{:indent$}{:?}: '{}'", "", pair.as_rule(), pair.as_str().trim(), indent = indent);
    for inner in pair.into_inner() {
        print_tree(inner, indent + 2);
    }
}

/// Parse a query string such as `Hosts/host_name=h1&Hosts/cpu_count>=4` into a predicate.
///
/// `!` binds tighter than `&`, which binds tighter than `|`; parentheses group. Literals are typed
/// on parse (see [`infer_literal`]).
pub fn parse_predicate(input: &str) -> Result<Predicate, ParseError> {
    let pairs = QueryParser::parse(Rule::Query, input)?;

    // Query is silent, so the first pair is the Expr
    let expr = pairs.into_iter().next().ok_or(ParseError::EmptyExpression)?;

    #[cfg(test)]
    print_tree(expr.clone(), 0);

    expect(&expr, Rule::Expr, "Expr")?;
    parse_expr(expr)
}

fn expect(pair: &Pair<Rule>, rule: Rule, expected: &'static str) -> Result<(), ParseError> {
    if pair.as_rule() != rule {
        return Err(ParseError::UnexpectedRule { expected, got: pair.as_rule() });
    }
    Ok(())
}

/// A disjunction of terms
fn parse_expr(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    let terms = pair.into_inner().map(parse_term).collect::<Result<Vec<_>, _>>()?;
    Predicate::disjunction(terms).ok_or(ParseError::MissingOperand("or"))
}

/// A conjunction of factors
fn parse_term(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    expect(&pair, Rule::Term, "Term")?;
    let factors = pair.into_inner().map(parse_factor).collect::<Result<Vec<_>, _>>()?;
    Predicate::conjunction(factors).ok_or(ParseError::MissingOperand("and"))
}

fn parse_factor(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    expect(&pair, Rule::Factor, "Factor")?;
    let mut negations = 0;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::Not => negations += 1,
            _ => {
                let mut predicate = parse_primary(inner)?;
                for _ in 0..negations {
                    predicate = predicate.negate();
                }
                return Ok(predicate);
            }
        }
    }
    Err(ParseError::MissingOperand("negated"))
}

fn parse_primary(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    match pair.as_rule() {
        Rule::Group => {
            let inner = pair.into_inner().next().ok_or(ParseError::EmptyExpression)?;
            expect(&inner, Rule::Expr, "Expr")?;
            parse_expr(inner)
        }
        Rule::Comparison => parse_comparison(pair),
        Rule::Function => parse_function(pair),
        got => Err(ParseError::UnexpectedRule { expected: "Group, Function or Comparison", got }),
    }
}

fn parse_property_id(pair: Pair<Rule>) -> Result<PropertyId, ParseError> {
    expect(&pair, Rule::PropertyId, "PropertyId")?;
    let id = PropertyId::new(pair.as_str());
    if id.is_empty() {
        return Err(crate::error::PropertyIdError::Empty.into());
    }
    Ok(id)
}

fn parse_comparison(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    let mut inner = pair.into_inner();
    let property = parse_property_id(inner.next().ok_or(ParseError::MissingOperand("left"))?)?;

    let op = inner.next().ok_or(ParseError::MissingOperand("operator"))?;
    expect(&op, Rule::Operator, "Operator")?;
    let operator = match op.as_str() {
        "=" => ComparisonOperator::Equal,
        "!=" => ComparisonOperator::NotEqual,
        ">" => ComparisonOperator::GreaterThan,
        ">=" => ComparisonOperator::GreaterThanOrEqual,
        "<" => ComparisonOperator::LessThan,
        "<=" => ComparisonOperator::LessThanOrEqual,
        other => return Err(ParseError::SyntaxError(format!("unknown operator {}", other))),
    };

    let value = parse_literal(inner.next().ok_or(ParseError::MissingOperand("right"))?)?;
    Ok(Predicate::Comparison { property, operator, value })
}

fn parse_function(pair: Pair<Rule>) -> Result<Predicate, ParseError> {
    let mut inner = pair.into_inner();
    let property = parse_property_id(inner.next().ok_or(ParseError::MissingOperand("property"))?)?;
    let function = inner.next().ok_or(ParseError::MissingOperand("function"))?;
    match function.as_rule() {
        grammar::Rule::InFunction => {
            let values = function.into_inner().map(parse_literal).collect::<Result<Vec<_>, _>>()?;
            Ok(Predicate::In { property, values })
        }
        grammar::Rule::IsEmptyFunction => Ok(Predicate::IsEmpty(property)),
        got => Err(ParseError::UnexpectedRule { expected: "in() or isEmpty()", got }),
    }
}

fn parse_literal(pair: Pair<Rule>) -> Result<Value, ParseError> {
    match pair.as_rule() {
        Rule::BareLiteral => Ok(infer_literal(pair.as_str())),
        Rule::QuotedLiteral => Ok(Value::String(unquote(pair.as_str()))),
        got => Err(ParseError::UnexpectedRule { expected: "Literal", got }),
    }
}

/// Strip the surrounding quotes and resolve `\` escapes
fn unquote(text: &str) -> String {
    let inner = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')).unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Type a bare query-string literal: integers become `I64`, decimals `F64`, `true`/`false` `Bool`,
/// anything else stays a `String`.
pub fn infer_literal(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::I64(i);
    }
    let numeric = text.bytes().any(|b| b.is_ascii_digit())
        && text.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if numeric {
        if let Ok(f) = text.parse::<f64>() {
            return Value::F64(f);
        }
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}
