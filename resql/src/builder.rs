//! Fluent predicate construction.
//!
//! ```
//! use resql::{Predicate, PredicateBuilder};
//!
//! let predicate = PredicateBuilder::new()
//!     .begin()
//!     .property("Hosts/host_name").equals("h1")
//!     .or()
//!     .property("Hosts/host_name").equals("h2")
//!     .end()
//!     .and()
//!     .not()
//!     .property("Hosts/maintenance_state").equals("ON")
//!     .to_predicate()
//!     .unwrap();
//!
//! assert_eq!(predicate, Predicate::And(vec![
//!     Predicate::Or(vec![Predicate::equals("Hosts/host_name", "h1"), Predicate::equals("Hosts/host_name", "h2")]),
//!     Predicate::equals("Hosts/maintenance_state", "ON").negate(),
//! ]));
//! ```
//!
//! Connectors associate strictly left to right within a group: `a and b or c` builds `(a AND b) OR c`
//! and `a or b and c` builds `(a OR b) AND c`. Use `begin()`/`end()` for any other grouping.

use crate::ast::{ComparisonOperator, Predicate};
use crate::error::BuildError;
use crate::property::PropertyId;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connector {
    And,
    Or,
}

/// One grouping level
#[derive(Debug, Default)]
struct Frame {
    acc: Option<Predicate>,
    /// Connector that built `acc` at this level, so runs of the same connector extend one node
    acc_connector: Option<Connector>,
    pending: Option<Connector>,
    negate_next: bool,
    /// Negate the whole group when it is closed
    negated: bool,
}

impl Frame {
    fn push(&mut self, mut predicate: Predicate) {
        if std::mem::take(&mut self.negate_next) {
            predicate = predicate.negate();
        }
        let connector = self.pending.take().unwrap_or(Connector::And);
        let combined = match (self.acc.take(), connector, self.acc_connector) {
            (None, _, _) => {
                self.acc = Some(predicate);
                self.acc_connector = None;
                return;
            }
            (Some(Predicate::And(mut children)), Connector::And, Some(Connector::And)) => {
                children.push(predicate);
                Predicate::And(children)
            }
            (Some(Predicate::Or(mut children)), Connector::Or, Some(Connector::Or)) => {
                children.push(predicate);
                Predicate::Or(children)
            }
            (Some(acc), Connector::And, _) => Predicate::And(vec![acc, predicate]),
            (Some(acc), Connector::Or, _) => Predicate::Or(vec![acc, predicate]),
        };
        self.acc = Some(combined);
        self.acc_connector = Some(connector);
    }
}

#[derive(Debug)]
struct State {
    frames: Vec<Frame>,
    /// First misuse seen; reported by `to_predicate`
    error: Option<BuildError>,
}

impl State {
    fn new() -> Self { Self { frames: vec![Frame::default()], error: None } }

    fn with_frame(&mut self, f: impl FnOnce(&mut Frame)) {
        if let Some(frame) = self.frames.last_mut() {
            f(frame);
        }
    }

    fn fail(&mut self, error: BuildError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn begin(&mut self) {
        let mut negated = false;
        self.with_frame(|frame| negated = std::mem::take(&mut frame.negate_next));
        self.frames.push(Frame { negated, ..Frame::default() });
    }

    fn end(&mut self) {
        if self.frames.len() <= 1 {
            self.fail(BuildError::UnexpectedEnd);
            return;
        }
        let Some(frame) = self.frames.pop() else { return };
        match frame.acc {
            Some(group) => {
                let group = if frame.negated { group.negate() } else { group };
                self.with_frame(|parent| parent.push(group));
            }
            None => self.fail(BuildError::NoPredicate),
        }
    }

    fn to_predicate(mut self) -> Result<Predicate, BuildError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.frames.len() > 1 {
            return Err(BuildError::UnbalancedGroup(self.frames.len() - 1));
        }
        let frame = self.frames.pop().ok_or(BuildError::NoPredicate)?;
        if frame.pending.is_some() || frame.negate_next {
            return Err(BuildError::DanglingConnector);
        }
        frame.acc.ok_or(BuildError::NoPredicate)
    }
}

/// Builder state expecting a property, `not()` or `begin()`
#[derive(Debug)]
pub struct PredicateBuilder {
    state: State,
}

impl Default for PredicateBuilder {
    fn default() -> Self { Self::new() }
}

impl PredicateBuilder {
    pub fn new() -> Self { Self { state: State::new() } }

    pub fn property(self, id: impl Into<PropertyId>) -> PredicateBuilderWithProperty {
        PredicateBuilderWithProperty { state: self.state, property: id.into() }
    }

    /// Negate the next comparison or group
    pub fn not(mut self) -> Self {
        self.state.with_frame(|frame| frame.negate_next = !frame.negate_next);
        self
    }

    /// Open a group, closed by [`PredicateBuilderWithPredicate::end`]
    pub fn begin(mut self) -> Self {
        self.state.begin();
        self
    }

    /// Fails: a builder in this state has no complete predicate
    pub fn to_predicate(self) -> Result<Predicate, BuildError> { self.state.to_predicate() }
}

/// Builder state holding a property, waiting for its operator
#[derive(Debug)]
pub struct PredicateBuilderWithProperty {
    state: State,
    property: PropertyId,
}

impl PredicateBuilderWithProperty {
    fn leaf(mut self, predicate: Predicate) -> PredicateBuilderWithPredicate {
        self.state.with_frame(|frame| frame.push(predicate));
        PredicateBuilderWithPredicate { state: self.state }
    }

    fn compare(self, operator: ComparisonOperator, value: impl Into<Value>) -> PredicateBuilderWithPredicate {
        let predicate = Predicate::Comparison { property: self.property.clone(), operator, value: value.into() };
        self.leaf(predicate)
    }

    pub fn equals(self, value: impl Into<Value>) -> PredicateBuilderWithPredicate { self.compare(ComparisonOperator::Equal, value) }

    pub fn not_equals(self, value: impl Into<Value>) -> PredicateBuilderWithPredicate { self.compare(ComparisonOperator::NotEqual, value) }

    pub fn greater_than(self, value: impl Into<Value>) -> PredicateBuilderWithPredicate { self.compare(ComparisonOperator::GreaterThan, value) }

    pub fn greater_than_equal_to(self, value: impl Into<Value>) -> PredicateBuilderWithPredicate {
        self.compare(ComparisonOperator::GreaterThanOrEqual, value)
    }

    pub fn less_than(self, value: impl Into<Value>) -> PredicateBuilderWithPredicate { self.compare(ComparisonOperator::LessThan, value) }

    pub fn less_than_equal_to(self, value: impl Into<Value>) -> PredicateBuilderWithPredicate {
        self.compare(ComparisonOperator::LessThanOrEqual, value)
    }

    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> PredicateBuilderWithPredicate {
        let predicate = Predicate::is_in(self.property.clone(), values);
        self.leaf(predicate)
    }

    /// The property names a category that must be absent or empty
    pub fn is_empty(self) -> PredicateBuilderWithPredicate {
        let predicate = Predicate::IsEmpty(self.property.clone());
        self.leaf(predicate)
    }
}

/// Builder state after a complete comparison or group
#[derive(Debug)]
pub struct PredicateBuilderWithPredicate {
    state: State,
}

impl PredicateBuilderWithPredicate {
    fn connect(mut self, connector: Connector) -> PredicateBuilder {
        self.state.with_frame(|frame| frame.pending = Some(connector));
        PredicateBuilder { state: self.state }
    }

    pub fn and(self) -> PredicateBuilder { self.connect(Connector::And) }

    pub fn or(self) -> PredicateBuilder { self.connect(Connector::Or) }

    /// Close the innermost group opened by `begin()`
    pub fn end(mut self) -> Self {
        self.state.end();
        self
    }

    pub fn to_predicate(self) -> Result<Predicate, BuildError> { self.state.to_predicate() }
}
