//! Generic filter predicates over property identifiers.
//!
//! A [`Predicate`] is what callers hand to a resource provider: comparisons
//! of a property identifier against a string literal, combined with AND, OR
//! and NOT. Literals stay strings here; they only gain a type when the
//! predicate is translated against a [`PropertyTable`](crate::property::PropertyTable).
//!
//! # Examples
//!
//! ```
//! use task_resources::constants::{TASK_ID_PROPERTY_ID, TASK_REQUEST_ID_PROPERTY_ID};
//! use task_resources::predicate::Predicate;
//!
//! let predicate = Predicate::property(TASK_ID_PROPERTY_ID)
//!     .equals("100")
//!     .and(Predicate::property(TASK_REQUEST_ID_PROPERTY_ID).equals("100"));
//!
//! assert_eq!(predicate.to_string(), "Tasks/id=100 AND Tasks/request_id=100");
//! assert_eq!(
//!     predicate.property_ids(),
//!     vec![TASK_ID_PROPERTY_ID, TASK_REQUEST_ID_PROPERTY_ID]
//! );
//! ```

use std::fmt;

/// Comparison operator of a predicate clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl ComparisonOperator {
    /// Returns `true` for `=` and `!=`.
    pub fn is_equality(&self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    /// Operator symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A boolean filter expression over property identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `property_id <operator> value`.
    Comparison {
        /// Property identifier, e.g. `Tasks/id`.
        property_id: String,
        /// Operator.
        operator: ComparisonOperator,
        /// Literal, always a string.
        value: String,
    },
    /// All children hold.
    And(Vec<Predicate>),
    /// At least one child holds.
    Or(Vec<Predicate>),
    /// The child does not hold.
    Not(Box<Predicate>),
}

/// Starts a comparison clause on one property. See [`Predicate::property`].
#[derive(Debug, Clone)]
pub struct PropertyClause {
    property_id: String,
}

impl PropertyClause {
    fn compare(self, operator: ComparisonOperator, value: impl Into<String>) -> Predicate {
        Predicate::Comparison {
            property_id: self.property_id,
            operator,
            value: value.into(),
        }
    }

    /// `property = value`
    pub fn equals(self, value: impl Into<String>) -> Predicate {
        self.compare(ComparisonOperator::Equal, value)
    }

    /// `property != value`
    pub fn not_equals(self, value: impl Into<String>) -> Predicate {
        self.compare(ComparisonOperator::NotEqual, value)
    }

    /// `property < value`
    pub fn less_than(self, value: impl Into<String>) -> Predicate {
        self.compare(ComparisonOperator::Less, value)
    }

    /// `property <= value`
    pub fn less_than_or_equal(self, value: impl Into<String>) -> Predicate {
        self.compare(ComparisonOperator::LessOrEqual, value)
    }

    /// `property > value`
    pub fn greater_than(self, value: impl Into<String>) -> Predicate {
        self.compare(ComparisonOperator::Greater, value)
    }

    /// `property >= value`
    pub fn greater_than_or_equal(self, value: impl Into<String>) -> Predicate {
        self.compare(ComparisonOperator::GreaterOrEqual, value)
    }
}

impl Predicate {
    /// Starts a clause on `property_id`.
    pub fn property(property_id: impl Into<String>) -> PropertyClause {
        PropertyClause {
            property_id: property_id.into(),
        }
    }

    /// Conjunction. Nested conjunctions are flattened.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            },
            (Self::And(mut left), right) => {
                left.push(right);
                Self::And(left)
            },
            (left, Self::And(mut right)) => {
                right.insert(0, left);
                Self::And(right)
            },
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Disjunction. Nested disjunctions are flattened.
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            },
            (Self::Or(mut left), right) => {
                left.push(right);
                Self::Or(left)
            },
            (left, Self::Or(mut right)) => {
                right.insert(0, left);
                Self::Or(right)
            },
            (left, right) => Self::Or(vec![left, right]),
        }
    }

    /// Negation.
    pub fn negate(self) -> Predicate {
        Self::Not(Box::new(self))
    }

    /// Every property identifier referenced, in first-seen order.
    pub fn property_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_property_ids(&mut ids);
        ids
    }

    fn collect_property_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            Self::Comparison { property_id, .. } => {
                if !ids.contains(&property_id.as_str()) {
                    ids.push(property_id);
                }
            },
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_property_ids(ids);
                }
            },
            Self::Not(child) => child.collect_property_ids(ids),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                match child {
                    Predicate::And(_) | Predicate::Or(_) => write!(f, "({child})")?,
                    _ => write!(f, "{child}")?,
                }
            }
            Ok(())
        }

        match self {
            Self::Comparison {
                property_id,
                operator,
                value,
            } => write!(f, "{property_id}{operator}{value}"),
            Self::And(children) => join(f, children, " AND "),
            Self::Or(children) => join(f, children, " OR "),
            Self::Not(child) => write!(f, "NOT ({child})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eq(id: &str, value: &str) -> Predicate {
        Predicate::property(id).equals(value)
    }

    #[test]
    fn clause_builders_pick_operators() {
        let cases = [
            (Predicate::property("p").equals("1"), ComparisonOperator::Equal),
            (Predicate::property("p").not_equals("1"), ComparisonOperator::NotEqual),
            (Predicate::property("p").less_than("1"), ComparisonOperator::Less),
            (Predicate::property("p").less_than_or_equal("1"), ComparisonOperator::LessOrEqual),
            (Predicate::property("p").greater_than("1"), ComparisonOperator::Greater),
            (
                Predicate::property("p").greater_than_or_equal("1"),
                ComparisonOperator::GreaterOrEqual,
            ),
        ];
        for (predicate, expected) in cases {
            match predicate {
                Predicate::Comparison { operator, .. } => assert_eq!(operator, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn and_flattens() {
        let predicate = eq("a", "1").and(eq("b", "2")).and(eq("c", "3"));
        assert_eq!(
            predicate,
            Predicate::And(vec![eq("a", "1"), eq("b", "2"), eq("c", "3")])
        );

        let right = eq("b", "2").and(eq("c", "3"));
        assert_eq!(
            eq("a", "1").and(right),
            Predicate::And(vec![eq("a", "1"), eq("b", "2"), eq("c", "3")])
        );
    }

    #[test]
    fn or_does_not_absorb_and() {
        let predicate = eq("a", "1").and(eq("b", "2")).or(eq("c", "3"));
        assert_eq!(
            predicate,
            Predicate::Or(vec![
                Predicate::And(vec![eq("a", "1"), eq("b", "2")]),
                eq("c", "3"),
            ])
        );
        assert_eq!(predicate.to_string(), "(a=1 AND b=2) OR c=3");
    }

    #[test]
    fn negate_wraps() {
        let predicate = eq("a", "1").negate();
        assert_eq!(predicate.to_string(), "NOT (a=1)");
    }

    #[test]
    fn property_ids_are_deduplicated() {
        let predicate = eq("a", "1").or(eq("b", "2")).and(eq("a", "3").negate());
        assert_eq!(predicate.property_ids(), vec!["a", "b"]);
    }
}
