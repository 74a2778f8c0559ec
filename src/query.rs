//! Storage-native task queries and the predicate translator.
//!
//! A [`TaskQuery`] speaks only the record's vocabulary ([`TaskField`],
//! [`FieldValue`]). [`PredicateTranslator`] builds one from a generic
//! [`Predicate`] by resolving each property identifier through the
//! [`PropertyTable`] and coercing each literal to the property's type.
//! Translation either succeeds for the whole predicate or fails; a clause is
//! never dropped.
//!
//! # Null semantics
//!
//! Filters evaluate with three-valued logic. A comparison against an unset
//! column is unknown, `NOT unknown` stays unknown, and only records whose
//! filter evaluates to true match.
//!
//! # Examples
//!
//! ```
//! use task_resources::constants::{TASK_ID_PROPERTY_ID, TASK_REQUEST_ID_PROPERTY_ID};
//! use task_resources::predicate::Predicate;
//! use task_resources::property::PropertyTable;
//! use task_resources::query::{KeyConstraint, PredicateTranslator};
//!
//! let predicate = Predicate::property(TASK_ID_PROPERTY_ID)
//!     .equals("100")
//!     .and(Predicate::property(TASK_REQUEST_ID_PROPERTY_ID).equals("100"));
//!
//! let translator = PredicateTranslator::new(PropertyTable::tasks());
//! let query = translator.build_query(Some(&predicate), &[], None).unwrap();
//! assert_eq!(
//!     query.filter.as_ref().unwrap().to_string(),
//!     "task_id = 100 AND request_id = 100"
//! );
//! assert_eq!(
//!     query.key_constraint(),
//!     KeyConstraint { request_id: Some(100), task_id: Some(100) }
//! );
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::domain::{FieldValue, TaskField, TaskRecord};
use crate::error::TranslationError;
use crate::predicate::{ComparisonOperator, Predicate};
use crate::property::{PropertyDefinition, PropertyTable};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sort key expressed as a property identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequest {
    /// Property to order by.
    pub property_id: String,
    /// Direction.
    pub order: SortOrder,
}

impl SortRequest {
    /// Ascending order on `property_id`.
    pub fn ascending(property_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            order: SortOrder::Ascending,
        }
    }

    /// Descending order on `property_id`.
    pub fn descending(property_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            order: SortOrder::Descending,
        }
    }
}

/// Sort key expressed as a record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSort {
    /// Column to order by.
    pub field: TaskField,
    /// Direction.
    pub order: SortOrder,
}

/// A window over the sorted, filtered records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Records to skip.
    pub offset: usize,
    /// Maximum number of records to return. `None` means no limit.
    pub limit: Option<usize>,
}

impl PageRequest {
    /// A page of at most `limit` records starting at `offset`.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }
}

/// A filter over record columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter {
    /// `field <operator> value`.
    Compare {
        /// Column compared.
        field: TaskField,
        /// Operator.
        operator: ComparisonOperator,
        /// Typed literal.
        value: FieldValue,
    },
    /// All children hold.
    And(Vec<FieldFilter>),
    /// At least one child holds.
    Or(Vec<FieldFilter>),
    /// The child does not hold.
    Not(Box<FieldFilter>),
}

impl FieldFilter {
    /// Three-valued evaluation against `record`; `None` means unknown.
    pub fn evaluate(&self, record: &TaskRecord) -> Option<bool> {
        match self {
            Self::Compare {
                field,
                operator,
                value,
            } => {
                let actual = record.field(*field)?;
                match operator {
                    ComparisonOperator::Equal => Some(actual == *value),
                    ComparisonOperator::NotEqual => Some(actual != *value),
                    ComparisonOperator::Less => actual.compare(value).map(Ordering::is_lt),
                    ComparisonOperator::LessOrEqual => actual.compare(value).map(Ordering::is_le),
                    ComparisonOperator::Greater => actual.compare(value).map(Ordering::is_gt),
                    ComparisonOperator::GreaterOrEqual => {
                        actual.compare(value).map(Ordering::is_ge)
                    },
                }
            },
            Self::And(children) => {
                let mut unknown = false;
                for child in children {
                    match child.evaluate(record) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {},
                    }
                }
                (!unknown).then_some(true)
            },
            Self::Or(children) => {
                let mut unknown = false;
                for child in children {
                    match child.evaluate(record) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {},
                    }
                }
                (!unknown).then_some(false)
            },
            Self::Not(child) => child.evaluate(record).map(|v| !v),
        }
    }

    /// Returns `true` if the filter evaluates to true for `record`.
    pub fn matches(&self, record: &TaskRecord) -> bool {
        self.evaluate(record) == Some(true)
    }

    fn collect_key_constraint(&self, constraint: &mut KeyConstraint) {
        match self {
            Self::Compare {
                field,
                operator: ComparisonOperator::Equal,
                value: FieldValue::Integer(v),
            } => match field {
                TaskField::RequestId if constraint.request_id.is_none() => {
                    constraint.request_id = Some(*v);
                },
                TaskField::TaskId if constraint.task_id.is_none() => {
                    constraint.task_id = Some(*v);
                },
                _ => {},
            },
            Self::And(children) => {
                for child in children {
                    child.collect_key_constraint(constraint);
                }
            },
            _ => {},
        }
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[FieldFilter], sep: &str) -> fmt::Result {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                match child {
                    FieldFilter::And(_) | FieldFilter::Or(_) => write!(f, "({child})")?,
                    _ => write!(f, "{child}")?,
                }
            }
            Ok(())
        }

        match self {
            Self::Compare {
                field,
                operator,
                value,
            } => write!(f, "{field} {operator} {value}"),
            Self::And(children) => join(f, children, " AND "),
            Self::Or(children) => join(f, children, " OR "),
            Self::Not(child) => write!(f, "NOT ({child})"),
        }
    }
}

/// Key columns pinned to a single value by a query's top-level conjunction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyConstraint {
    /// Request id, when constrained by equality.
    pub request_id: Option<i64>,
    /// Task id, when constrained by equality.
    pub task_id: Option<i64>,
}

/// A query in the record's own vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Row filter. `None` matches every record.
    pub filter: Option<FieldFilter>,
    /// Sort keys, most significant first.
    pub sort: Vec<FieldSort>,
    /// Window applied after filtering and sorting.
    pub page: Option<PageRequest>,
}

impl TaskQuery {
    /// A query matching every record in key order.
    pub fn all() -> Self {
        Self::default()
    }

    /// A query with the given filter.
    pub fn filtered(filter: FieldFilter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Returns `true` if `record` passes the filter.
    pub fn matches(&self, record: &TaskRecord) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(record))
    }

    /// Equality constraints on the key columns implied by the filter.
    ///
    /// Only constraints that every matching record must satisfy are
    /// reported, so a store may restrict its scan to them.
    pub fn key_constraint(&self) -> KeyConstraint {
        let mut constraint = KeyConstraint::default();
        if let Some(filter) = &self.filter {
            filter.collect_key_constraint(&mut constraint);
        }
        constraint
    }

    /// Result order: the sort keys, then `(request_id, task_id)` ascending.
    ///
    /// Unset columns sort before set ones.
    pub fn compare_records(&self, a: &TaskRecord, b: &TaskRecord) -> Ordering {
        self.sort
            .iter()
            .map(|key| {
                let ordering = match (a.field(key.field), b.field(key.field)) {
                    (Some(x), Some(y)) => x.sort_cmp(&y),
                    (None, Some(_)) => Ordering::Less,
                    (Some(_), None) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match key.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.key().cmp(&b.key()))
    }

    /// Filters, sorts and pages `candidates`.
    pub fn execute<'a, I>(&self, candidates: I) -> Vec<TaskRecord>
    where
        I: IntoIterator<Item = &'a TaskRecord>,
    {
        let mut matched: Vec<&TaskRecord> = candidates
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        matched.sort_by(|a, b| self.compare_records(a, b));

        let page = self.page.unwrap_or_default();
        matched
            .into_iter()
            .skip(page.offset)
            .take(page.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

/// Translates generic predicates and sort requests into a [`TaskQuery`].
#[derive(Debug, Clone, Copy)]
pub struct PredicateTranslator<'a> {
    table: &'a PropertyTable,
}

impl<'a> PredicateTranslator<'a> {
    /// Creates a translator resolving identifiers through `table`.
    pub fn new(table: &'a PropertyTable) -> Self {
        Self { table }
    }

    fn resolve(&self, property_id: &str) -> Result<&'a PropertyDefinition, TranslationError> {
        self.table
            .get(property_id)
            .ok_or_else(|| TranslationError::UnknownProperty {
                property_id: property_id.to_string(),
            })
    }

    /// Translates `predicate` into a column filter.
    ///
    /// # Errors
    ///
    /// - [`TranslationError::UnknownProperty`] for identifiers not in the table.
    /// - [`TranslationError::UnsupportedOperator`] when the property's type
    ///   does not support the operator.
    /// - [`TranslationError::InvalidLiteral`] when the literal cannot be
    ///   coerced to the property's type.
    /// - [`TranslationError::EmptyCombination`] for an AND/OR without children.
    pub fn translate(&self, predicate: &Predicate) -> Result<FieldFilter, TranslationError> {
        match predicate {
            Predicate::Comparison {
                property_id,
                operator,
                value,
            } => {
                let definition = self.resolve(property_id)?;
                let property_type = definition.property_type;
                if !property_type.supports(*operator) {
                    return Err(TranslationError::UnsupportedOperator {
                        property_id: property_id.clone(),
                        operator: *operator,
                        property_type: property_type.name(),
                    });
                }
                let value =
                    property_type
                        .coerce(value)
                        .ok_or_else(|| TranslationError::InvalidLiteral {
                            property_id: property_id.clone(),
                            value: value.clone(),
                            expected: property_type.name(),
                        })?;
                Ok(FieldFilter::Compare {
                    field: definition.field,
                    operator: *operator,
                    value,
                })
            },
            Predicate::And(children) => Ok(FieldFilter::And(self.translate_all(children, "AND")?)),
            Predicate::Or(children) => Ok(FieldFilter::Or(self.translate_all(children, "OR")?)),
            Predicate::Not(child) => Ok(FieldFilter::Not(Box::new(self.translate(child)?))),
        }
    }

    fn translate_all(
        &self,
        children: &[Predicate],
        combinator: &'static str,
    ) -> Result<Vec<FieldFilter>, TranslationError> {
        if children.is_empty() {
            return Err(TranslationError::EmptyCombination { combinator });
        }
        children.iter().map(|child| self.translate(child)).collect()
    }

    /// Translates sort requests into column sort keys.
    ///
    /// # Errors
    ///
    /// - [`TranslationError::UnknownProperty`] for identifiers not in the table.
    /// - [`TranslationError::UnsortableProperty`] for structured output.
    pub fn translate_sort(&self, sort: &[SortRequest]) -> Result<Vec<FieldSort>, TranslationError> {
        sort.iter()
            .map(|request| {
                let definition = self.resolve(&request.property_id)?;
                if !definition.property_type.is_sortable() {
                    return Err(TranslationError::UnsortableProperty {
                        property_id: request.property_id.clone(),
                    });
                }
                Ok(FieldSort {
                    field: definition.field,
                    order: request.order,
                })
            })
            .collect()
    }

    /// Builds the full storage query for a read.
    ///
    /// # Errors
    ///
    /// Any error of [`translate`](Self::translate) or
    /// [`translate_sort`](Self::translate_sort).
    pub fn build_query(
        &self,
        predicate: Option<&Predicate>,
        sort: &[SortRequest],
        page: Option<PageRequest>,
    ) -> Result<TaskQuery, TranslationError> {
        Ok(TaskQuery {
            filter: predicate.map(|p| self.translate(p)).transpose()?,
            sort: self.translate_sort(sort)?,
            page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::domain::HostRoleStatus;
    use pretty_assertions::assert_eq;

    fn translator() -> PredicateTranslator<'static> {
        PredicateTranslator::new(PropertyTable::tasks())
    }

    fn compare(field: TaskField, operator: ComparisonOperator, value: FieldValue) -> FieldFilter {
        FieldFilter::Compare {
            field,
            operator,
            value,
        }
    }

    #[test]
    fn translates_integer_equality() {
        let filter = translator()
            .translate(&Predicate::property(TASK_ID_PROPERTY_ID).equals("100"))
            .unwrap();
        assert_eq!(
            filter,
            compare(TaskField::TaskId, ComparisonOperator::Equal, FieldValue::Integer(100))
        );
    }

    #[test]
    fn preserves_structure() {
        let predicate = Predicate::property(TASK_STATUS_PROPERTY_ID)
            .equals("FAILED")
            .or(Predicate::property(TASK_EXIT_CODE_PROPERTY_ID).not_equals("0"))
            .and(Predicate::property(TASK_ROLE_PROPERTY_ID).equals("DATANODE").negate());
        let filter = translator().translate(&predicate).unwrap();
        assert_eq!(
            filter,
            FieldFilter::And(vec![
                FieldFilter::Or(vec![
                    compare(
                        TaskField::Status,
                        ComparisonOperator::Equal,
                        FieldValue::Status(HostRoleStatus::Failed)
                    ),
                    compare(
                        TaskField::ExitCode,
                        ComparisonOperator::NotEqual,
                        FieldValue::Integer(0)
                    ),
                ]),
                FieldFilter::Not(Box::new(compare(
                    TaskField::Role,
                    ComparisonOperator::Equal,
                    FieldValue::Text("DATANODE".to_string())
                ))),
            ])
        );
        assert_eq!(
            filter.to_string(),
            "(status = FAILED OR exit_code != 0) AND NOT (role = 'DATANODE')"
        );
    }

    #[test]
    fn unknown_property_fails() {
        let err = translator()
            .translate(&Predicate::property("Tasks/bogus").equals("1"))
            .unwrap_err();
        assert_eq!(
            err,
            TranslationError::UnknownProperty {
                property_id: "Tasks/bogus".to_string()
            }
        );
    }

    #[test]
    fn unknown_property_deep_in_tree_fails() {
        let predicate = Predicate::property(TASK_ID_PROPERTY_ID)
            .equals("1")
            .or(Predicate::property("Hosts/host_name").equals("h1").negate());
        assert!(matches!(
            translator().translate(&predicate),
            Err(TranslationError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn invalid_integer_literal_fails() {
        let err = translator()
            .translate(&Predicate::property(TASK_ID_PROPERTY_ID).equals("Task100"))
            .unwrap_err();
        assert_eq!(
            err,
            TranslationError::InvalidLiteral {
                property_id: TASK_ID_PROPERTY_ID.to_string(),
                value: "Task100".to_string(),
                expected: "integer",
            }
        );
    }

    #[test]
    fn ordering_on_text_fails() {
        let err = translator()
            .translate(&Predicate::property(TASK_HOST_NAME_PROPERTY_ID).greater_than("h"))
            .unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedOperator { .. }));
    }

    #[test]
    fn structured_output_is_not_filterable() {
        let err = translator()
            .translate(&Predicate::property(TASK_STRUCTURED_OUT_PROPERTY_ID).equals("{}"))
            .unwrap_err();
        assert!(matches!(
            err,
            TranslationError::UnsupportedOperator {
                property_type: "structured output",
                ..
            }
        ));
    }

    #[test]
    fn empty_combinations_fail() {
        assert_eq!(
            translator().translate(&Predicate::And(vec![])),
            Err(TranslationError::EmptyCombination { combinator: "AND" })
        );
        assert_eq!(
            translator().translate(&Predicate::Or(vec![])),
            Err(TranslationError::EmptyCombination { combinator: "OR" })
        );
    }

    #[test]
    fn sort_translation() {
        let sort = translator()
            .translate_sort(&[
                SortRequest::descending(TASK_START_TIME_PROPERTY_ID),
                SortRequest::ascending(TASK_HOST_NAME_PROPERTY_ID),
            ])
            .unwrap();
        assert_eq!(
            sort,
            vec![
                FieldSort {
                    field: TaskField::StartTime,
                    order: SortOrder::Descending
                },
                FieldSort {
                    field: TaskField::HostName,
                    order: SortOrder::Ascending
                },
            ]
        );
        assert!(matches!(
            translator().translate_sort(&[SortRequest::ascending(TASK_STRUCTURED_OUT_PROPERTY_ID)]),
            Err(TranslationError::UnsortableProperty { .. })
        ));
    }

    #[test]
    fn comparisons_against_unset_columns_are_unknown() {
        let record = TaskRecord::new(1, 1, 1, "DATANODE");
        let eq = compare(TaskField::ExitCode, ComparisonOperator::Equal, FieldValue::Integer(0));
        let ne = compare(TaskField::ExitCode, ComparisonOperator::NotEqual, FieldValue::Integer(0));
        assert_eq!(eq.evaluate(&record), None);
        assert_eq!(ne.evaluate(&record), None);
        assert_eq!(FieldFilter::Not(Box::new(eq.clone())).evaluate(&record), None);
        assert!(!ne.matches(&record));
    }

    #[test]
    fn three_valued_and_or() {
        let record = TaskRecord::new(1, 1, 1, "DATANODE");
        let unknown = compare(
            TaskField::ExitCode,
            ComparisonOperator::Equal,
            FieldValue::Integer(0),
        );
        let yes = compare(TaskField::TaskId, ComparisonOperator::Equal, FieldValue::Integer(1));
        let no = compare(TaskField::TaskId, ComparisonOperator::Equal, FieldValue::Integer(2));

        let and = |a: &FieldFilter, b: &FieldFilter| FieldFilter::And(vec![a.clone(), b.clone()]);
        let or = |a: &FieldFilter, b: &FieldFilter| FieldFilter::Or(vec![a.clone(), b.clone()]);
        assert_eq!(and(&unknown, &no).evaluate(&record), Some(false));
        assert_eq!(and(&unknown, &yes).evaluate(&record), None);
        assert_eq!(or(&unknown, &yes).evaluate(&record), Some(true));
        assert_eq!(or(&unknown, &no).evaluate(&record), None);
    }

    #[test]
    fn key_constraint_from_top_level_conjunction_only() {
        let query = translator()
            .build_query(
                Some(
                    &Predicate::property(TASK_REQUEST_ID_PROPERTY_ID)
                        .equals("5")
                        .and(Predicate::property(TASK_STAGE_ID_PROPERTY_ID).equals("2")),
                ),
                &[],
                None,
            )
            .unwrap();
        assert_eq!(
            query.key_constraint(),
            KeyConstraint {
                request_id: Some(5),
                task_id: None
            }
        );

        let query = translator()
            .build_query(
                Some(
                    &Predicate::property(TASK_ID_PROPERTY_ID)
                        .equals("1")
                        .or(Predicate::property(TASK_ID_PROPERTY_ID).equals("2")),
                ),
                &[],
                None,
            )
            .unwrap();
        assert_eq!(query.key_constraint(), KeyConstraint::default());

        let query = translator()
            .build_query(
                Some(&Predicate::property(TASK_ID_PROPERTY_ID).greater_than("1")),
                &[],
                None,
            )
            .unwrap();
        assert_eq!(query.key_constraint(), KeyConstraint::default());
    }

    #[test]
    fn execute_sorts_and_pages() {
        let records = vec![
            TaskRecord::new(2, 1, 1, "B").with_times(30, None),
            TaskRecord::new(1, 2, 1, "A").with_times(10, None),
            TaskRecord::new(1, 1, 1, "C"),
            TaskRecord::new(1, 3, 1, "D").with_times(20, None),
        ];

        let keys = |query: &TaskQuery| -> Vec<(i64, i64)> {
            query.execute(&records).iter().map(TaskRecord::key).collect()
        };

        assert_eq!(keys(&TaskQuery::all()), vec![(1, 1), (1, 2), (1, 3), (2, 1)]);

        let by_start = TaskQuery {
            sort: vec![FieldSort {
                field: TaskField::StartTime,
                order: SortOrder::Descending,
            }],
            ..TaskQuery::default()
        };
        assert_eq!(keys(&by_start), vec![(2, 1), (1, 3), (1, 2), (1, 1)]);

        let paged = TaskQuery {
            page: Some(PageRequest::new(1, 2)),
            ..TaskQuery::default()
        };
        assert_eq!(keys(&paged), vec![(1, 2), (1, 3)]);
    }
}
