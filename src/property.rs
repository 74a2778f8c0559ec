//! The property projection table.
//!
//! Maps every externally visible property identifier of the task resource to
//! the record column it reads, the semantic type literals are coerced to, and
//! whether it is part of the resource key. The table is built once and
//! consulted both when projecting records and when translating predicates.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::constants::*;
use crate::domain::{FieldValue, HostRoleStatus, RoleCommand, TaskField};
use crate::predicate::ComparisonOperator;

/// Semantic type of a property, governing literal coercion and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// 64-bit signed integer.
    Integer,
    /// Epoch milliseconds, compared as an integer.
    Timestamp,
    /// Free text.
    Text,
    /// A [`HostRoleStatus`] name.
    Status,
    /// A [`RoleCommand`] name.
    Command,
    /// Decoded structured output; not filterable.
    Structured,
}

impl PropertyType {
    /// Returns `true` if clauses on this type may use `operator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use task_resources::predicate::ComparisonOperator;
    /// use task_resources::property::PropertyType;
    ///
    /// assert!(PropertyType::Integer.supports(ComparisonOperator::Less));
    /// assert!(PropertyType::Text.supports(ComparisonOperator::Equal));
    /// assert!(!PropertyType::Text.supports(ComparisonOperator::Greater));
    /// assert!(!PropertyType::Structured.supports(ComparisonOperator::Equal));
    /// ```
    pub fn supports(&self, operator: ComparisonOperator) -> bool {
        match self {
            Self::Integer | Self::Timestamp => true,
            Self::Text | Self::Status | Self::Command => operator.is_equality(),
            Self::Structured => false,
        }
    }

    /// Returns `true` if results may be ordered by a property of this type.
    pub fn is_sortable(&self) -> bool {
        !matches!(self, Self::Structured)
    }

    /// Human readable type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Timestamp => "timestamp",
            Self::Text => "text",
            Self::Status => "status",
            Self::Command => "command",
            Self::Structured => "structured output",
        }
    }

    /// Coerces a string literal to this type's storage value.
    ///
    /// Returns `None` when the literal is not a valid value of the type.
    pub fn coerce(&self, literal: &str) -> Option<FieldValue> {
        match self {
            Self::Integer | Self::Timestamp => literal.trim().parse().ok().map(FieldValue::Integer),
            Self::Text => Some(FieldValue::Text(literal.to_string())),
            Self::Status => literal.parse::<HostRoleStatus>().ok().map(FieldValue::Status),
            Self::Command => literal.parse::<RoleCommand>().ok().map(FieldValue::Command),
            Self::Structured => None,
        }
    }
}

/// One row of the projection table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefinition {
    /// External identifier, e.g. `Tasks/id`.
    pub id: &'static str,
    /// Record column the property reads.
    pub field: TaskField,
    /// Semantic type.
    pub property_type: PropertyType,
    /// Whether the property is part of the resource key.
    pub is_key: bool,
}

impl PropertyDefinition {
    const fn new(id: &'static str, field: TaskField, property_type: PropertyType) -> Self {
        Self {
            id,
            field,
            property_type,
            is_key: false,
        }
    }

    const fn key(id: &'static str, field: TaskField) -> Self {
        Self {
            id,
            field,
            property_type: PropertyType::Integer,
            is_key: true,
        }
    }

    /// Category part of the identifier (`Tasks` for `Tasks/id`).
    pub fn category(&self) -> &'static str {
        self.id.split_once('/').map_or("", |(category, _)| category)
    }
}

const TASK_PROPERTIES: [PropertyDefinition; 20] = [
    PropertyDefinition::new(
        TASK_CLUSTER_NAME_PROPERTY_ID,
        TaskField::ClusterName,
        PropertyType::Text,
    ),
    PropertyDefinition::key(TASK_REQUEST_ID_PROPERTY_ID, TaskField::RequestId),
    PropertyDefinition::key(TASK_ID_PROPERTY_ID, TaskField::TaskId),
    PropertyDefinition::new(TASK_STAGE_ID_PROPERTY_ID, TaskField::StageId, PropertyType::Integer),
    PropertyDefinition::new(TASK_HOST_NAME_PROPERTY_ID, TaskField::HostName, PropertyType::Text),
    PropertyDefinition::new(TASK_ROLE_PROPERTY_ID, TaskField::Role, PropertyType::Text),
    PropertyDefinition::new(TASK_COMMAND_PROPERTY_ID, TaskField::Command, PropertyType::Command),
    PropertyDefinition::new(TASK_STATUS_PROPERTY_ID, TaskField::Status, PropertyType::Status),
    PropertyDefinition::new(TASK_EXIT_CODE_PROPERTY_ID, TaskField::ExitCode, PropertyType::Integer),
    PropertyDefinition::new(TASK_STDERR_PROPERTY_ID, TaskField::Stderr, PropertyType::Text),
    PropertyDefinition::new(TASK_STDOUT_PROPERTY_ID, TaskField::Stdout, PropertyType::Text),
    PropertyDefinition::new(TASK_OUTPUT_LOG_PROPERTY_ID, TaskField::OutputLog, PropertyType::Text),
    PropertyDefinition::new(TASK_ERROR_LOG_PROPERTY_ID, TaskField::ErrorLog, PropertyType::Text),
    PropertyDefinition::new(
        TASK_STRUCTURED_OUT_PROPERTY_ID,
        TaskField::StructuredOut,
        PropertyType::Structured,
    ),
    PropertyDefinition::new(
        TASK_START_TIME_PROPERTY_ID,
        TaskField::StartTime,
        PropertyType::Timestamp,
    ),
    PropertyDefinition::new(TASK_END_TIME_PROPERTY_ID, TaskField::EndTime, PropertyType::Timestamp),
    PropertyDefinition::new(
        TASK_ATTEMPT_COUNT_PROPERTY_ID,
        TaskField::AttemptCount,
        PropertyType::Integer,
    ),
    PropertyDefinition::new(
        TASK_COMMAND_DETAIL_PROPERTY_ID,
        TaskField::CommandDetail,
        PropertyType::Text,
    ),
    PropertyDefinition::new(
        TASK_CUSTOM_COMMAND_NAME_PROPERTY_ID,
        TaskField::CustomCommandName,
        PropertyType::Text,
    ),
    PropertyDefinition::new(
        TASK_OPS_DISPLAY_NAME_PROPERTY_ID,
        TaskField::OpsDisplayName,
        PropertyType::Text,
    ),
];

static TASKS_TABLE: OnceLock<PropertyTable> = OnceLock::new();

/// Property definitions selected by a read request.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Selected definitions, in table order, without duplicates.
    pub definitions: Vec<&'a PropertyDefinition>,
    /// Requested identifiers that name no property or category.
    pub unknown: Vec<String>,
}

/// Immutable lookup table from property id to [`PropertyDefinition`].
///
/// # Examples
///
/// ```
/// use task_resources::constants::TASK_ID_PROPERTY_ID;
/// use task_resources::domain::TaskField;
/// use task_resources::property::PropertyTable;
///
/// let table = PropertyTable::tasks();
/// let id = table.get(TASK_ID_PROPERTY_ID).unwrap();
/// assert_eq!(id.field, TaskField::TaskId);
/// assert!(id.is_key);
/// assert_eq!(table.for_field(TaskField::TaskId).unwrap().id, TASK_ID_PROPERTY_ID);
/// ```
#[derive(Debug)]
pub struct PropertyTable {
    definitions: Vec<PropertyDefinition>,
    by_id: HashMap<&'static str, usize>,
    by_field: HashMap<TaskField, usize>,
}

impl PropertyTable {
    /// Builds a table from a fixed list of definitions.
    ///
    /// Later definitions with a duplicate id or field are ignored.
    pub fn new(definitions: Vec<PropertyDefinition>) -> Self {
        let mut by_id = HashMap::with_capacity(definitions.len());
        let mut by_field = HashMap::with_capacity(definitions.len());
        for (index, definition) in definitions.iter().enumerate() {
            by_id.entry(definition.id).or_insert(index);
            by_field.entry(definition.field).or_insert(index);
        }
        Self {
            definitions,
            by_id,
            by_field,
        }
    }

    /// The table for the task resource type, built on first use.
    pub fn tasks() -> &'static Self {
        TASKS_TABLE.get_or_init(|| Self::new(TASK_PROPERTIES.to_vec()))
    }

    /// Looks up a property by identifier.
    pub fn get(&self, property_id: &str) -> Option<&PropertyDefinition> {
        self.by_id.get(property_id).map(|&i| &self.definitions[i])
    }

    /// Looks up the property projecting `field`.
    pub fn for_field(&self, field: TaskField) -> Option<&PropertyDefinition> {
        self.by_field.get(&field).map(|&i| &self.definitions[i])
    }

    /// All definitions, in declaration order.
    pub fn definitions(&self) -> &[PropertyDefinition] {
        &self.definitions
    }

    /// All property identifiers, in declaration order.
    pub fn property_ids(&self) -> Vec<&'static str> {
        self.definitions.iter().map(|d| d.id).collect()
    }

    /// Identifiers of the key properties.
    pub fn key_property_ids(&self) -> Vec<&'static str> {
        self.definitions
            .iter()
            .filter(|d| d.is_key)
            .map(|d| d.id)
            .collect()
    }

    /// Returns `true` if `id` names a category (`Tasks` or `Tasks/`).
    pub fn is_category(&self, id: &str) -> bool {
        let id = id.strip_suffix('/').unwrap_or(id);
        !id.is_empty() && self.definitions.iter().any(|d| d.category() == id)
    }

    /// Resolves requested identifiers to definitions.
    ///
    /// An empty request selects every property, as does a bare category.
    pub fn select<S: AsRef<str>>(&self, requested: &[S]) -> Selection<'_> {
        if requested.is_empty() {
            return Selection {
                definitions: self.definitions.iter().collect(),
                unknown: Vec::new(),
            };
        }

        let mut selected = vec![false; self.definitions.len()];
        let mut unknown = Vec::new();
        for id in requested.iter().map(AsRef::as_ref) {
            if let Some(&index) = self.by_id.get(id) {
                selected[index] = true;
            } else if self.is_category(id) {
                let category = id.strip_suffix('/').unwrap_or(id);
                for (index, definition) in self.definitions.iter().enumerate() {
                    if definition.category() == category {
                        selected[index] = true;
                    }
                }
            } else {
                unknown.push(id.to_string());
            }
        }

        Selection {
            definitions: self
                .definitions
                .iter()
                .zip(selected)
                .filter_map(|(definition, keep)| keep.then_some(definition))
                .collect(),
            unknown,
        }
    }
}
