//! Rewrite a predicate into OR-combined AND clauses over the supported properties of a provider.
//!
//! The result is what a provider pushes down to its backing store. Leaves on unsupported properties
//! cannot be filtered by the backend, so they are treated as non-restricting inside an AND and dropped
//! from an OR. Dropping an AND leaf widens a clause, and the in-memory filter that follows removes the
//! extra rows. Dropping an OR disjunct narrows the fetch, and no later filter can bring back the rows
//! only that disjunct would have selected. Callers must therefore reject predicates on unsupported
//! properties before simplifying, as [`ClusterController`](crate::ClusterController) does.

use crate::ast::Predicate;
use crate::property::PropertyId;
use indexmap::IndexSet;
use tracing::trace;

/// Answers whether a property id can be filtered on
pub trait PropertySupport {
    fn is_property_supported(&self, id: &str) -> bool;
}

impl PropertySupport for IndexSet<PropertyId> {
    fn is_property_supported(&self, id: &str) -> bool { self.contains(id) }
}

impl PropertySupport for IndexSet<String> {
    fn is_property_supported(&self, id: &str) -> bool { self.contains(id) }
}

impl<T: PropertySupport + ?Sized> PropertySupport for &T {
    fn is_property_supported(&self, id: &str) -> bool { (**self).is_property_supported(id) }
}

/// A disjunction of conjunctions, or nothing known about the subtree
enum Simplified {
    Unknown,
    Clauses(Vec<Vec<Predicate>>),
}

/// Simplify `predicate` into a list of clauses, each a single literal or an `And` of literals,
/// referencing only ids accepted by `supported`.
///
/// An empty list means no supported restriction could be derived: the caller should fetch unfiltered.
pub fn simplify<S: PropertySupport + ?Sized>(predicate: &Predicate, supported: &S) -> Vec<Predicate> {
    let clauses = match visit(predicate, supported) {
        Simplified::Unknown => Vec::new(),
        Simplified::Clauses(clauses) => clauses.into_iter().filter_map(Predicate::conjunction).collect(),
    };
    trace!("simplify({}) -> {} clause(s)", predicate, clauses.len());
    clauses
}

fn visit<S: PropertySupport + ?Sized>(predicate: &Predicate, supported: &S) -> Simplified {
    match predicate {
        Predicate::Comparison { .. } | Predicate::In { .. } | Predicate::IsEmpty(_) => literal(predicate, supported),
        Predicate::Always => Simplified::Unknown,
        Predicate::And(children) => visit_and(children.iter().map(|child| visit(child, supported))),
        Predicate::Or(children) => visit_or(children.iter().map(|child| visit(child, supported))),
        Predicate::Not(inner) => match inner.as_ref() {
            Predicate::Comparison { .. } | Predicate::In { .. } | Predicate::IsEmpty(_) => literal(predicate, supported),
            Predicate::Not(twice) => visit(twice, supported),
            Predicate::And(children) => visit_or(children.iter().map(|child| visit(&child.clone().negate(), supported))),
            Predicate::Or(children) => visit_and(children.iter().map(|child| visit(&child.clone().negate(), supported))),
            Predicate::Always => Simplified::Unknown,
        },
    }
}

fn literal<S: PropertySupport + ?Sized>(predicate: &Predicate, supported: &S) -> Simplified {
    match predicate.leaf_property() {
        Some(id) if supported.is_property_supported(id) => Simplified::Clauses(vec![vec![predicate.clone()]]),
        _ => Simplified::Unknown,
    }
}

fn visit_and(children: impl Iterator<Item = Simplified>) -> Simplified {
    let mut product: Option<Vec<Vec<Predicate>>> = None;
    for child in children {
        let Simplified::Clauses(clauses) = child else { continue };
        product = Some(match product {
            None => clauses,
            Some(left) => {
                let mut next = Vec::with_capacity(left.len() * clauses.len());
                for l in &left {
                    for r in &clauses {
                        let mut clause = l.clone();
                        for literal in r {
                            if !clause.contains(literal) {
                                clause.push(literal.clone());
                            }
                        }
                        next.push(clause);
                    }
                }
                dedupe(next)
            }
        });
    }
    product.map_or(Simplified::Unknown, Simplified::Clauses)
}

fn visit_or(children: impl Iterator<Item = Simplified>) -> Simplified {
    let mut any = false;
    let mut clauses = Vec::new();
    for child in children {
        if let Simplified::Clauses(child_clauses) = child {
            any = true;
            clauses.extend(child_clauses);
        }
    }
    if any {
        Simplified::Clauses(dedupe(clauses))
    } else {
        Simplified::Unknown
    }
}

/// Remove clauses holding the same literals as an earlier one, keeping first-seen order
fn dedupe(clauses: Vec<Vec<Predicate>>) -> Vec<Vec<Predicate>> {
    let mut out: Vec<Vec<Predicate>> = Vec::with_capacity(clauses.len());
    for clause in clauses {
        if !out.iter().any(|seen| same_literals(seen, &clause)) {
            out.push(clause);
        }
    }
    out
}

fn same_literals(a: &[Predicate], b: &[Predicate]) -> bool { a.iter().all(|l| b.contains(l)) && b.iter().all(|l| a.contains(l)) }
