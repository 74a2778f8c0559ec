//! Error types for task resource operations.
//!
//! [`ResourceError`] is the single error a caller of the provider sees. Each
//! failure class maps to one variant:
//!
//! - lifecycle mutations → [`ResourceError::UnsupportedOperation`]
//! - bad predicates or sort keys → [`ResourceError::Translation`]
//! - unknown requested properties → [`ResourceError::UnsupportedProperty`]
//! - storage failures → [`ResourceError::Storage`], passed through unchanged
//!
//! Structured output decode failures never appear here; they degrade to a
//! `null` property value.

use std::fmt;

use thiserror::Error;

use crate::predicate::ComparisonOperator;
use crate::resource::ResourceType;
use crate::store::StorageError;

/// A resource operation that can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// A predicate or sort request could not be expressed as a storage query.
///
/// Raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// The identifier is not in the property table.
    #[error("unknown property '{property_id}'")]
    UnknownProperty {
        /// The unresolved identifier.
        property_id: String,
    },

    /// The operator cannot be applied to the property's type.
    #[error("operator '{operator}' is not supported on {property_type} property '{property_id}'")]
    UnsupportedOperator {
        /// The property the clause targets.
        property_id: String,
        /// The rejected operator.
        operator: ComparisonOperator,
        /// Name of the property's semantic type.
        property_type: &'static str,
    },

    /// The literal is not a valid value of the property's type.
    #[error("value '{value}' for property '{property_id}' is not a valid {expected}")]
    InvalidLiteral {
        /// The property the clause targets.
        property_id: String,
        /// The literal as supplied.
        value: String,
        /// Name of the expected semantic type.
        expected: &'static str,
    },

    /// An AND/OR with no children.
    #[error("empty {combinator} in predicate")]
    EmptyCombination {
        /// `AND` or `OR`.
        combinator: &'static str,
    },

    /// Results cannot be ordered by this property.
    #[error("cannot sort by property '{property_id}'")]
    UnsortableProperty {
        /// The rejected sort property.
        property_id: String,
    },
}

/// Errors returned by a resource provider.
///
/// # Examples
///
/// ```
/// use task_resources::error::{Operation, ResourceError};
/// use task_resources::resource::ResourceType;
///
/// let err = ResourceError::UnsupportedOperation {
///     operation: Operation::Delete,
///     resource_type: ResourceType::Task,
/// };
/// assert_eq!(err.to_string(), "delete is not supported for Task resources");
/// assert!(err.is_unsupported_operation());
/// ```
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource type does not allow this operation.
    #[error("{operation} is not supported for {resource_type} resources")]
    UnsupportedOperation {
        /// The refused operation.
        operation: Operation,
        /// The resource type it was invoked on.
        resource_type: ResourceType,
    },

    /// The read requested properties the resource type does not declare.
    #[error("unsupported properties requested: {}", .property_ids.join(", "))]
    UnsupportedProperty {
        /// The unknown identifiers.
        property_ids: Vec<String>,
    },

    /// The predicate or sort request could not be translated.
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// The storage accessor failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ResourceError {
    /// Returns `true` for [`ResourceError::UnsupportedOperation`].
    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

/// Errors loading a [`ProviderConfig`](crate::config::ProviderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML is invalid or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_error_messages() {
        let err = TranslationError::UnsupportedOperator {
            property_id: "Tasks/role".to_string(),
            operator: ComparisonOperator::Greater,
            property_type: "text",
        };
        assert_eq!(
            err.to_string(),
            "operator '>' is not supported on text property 'Tasks/role'"
        );

        let err = TranslationError::InvalidLiteral {
            property_id: "Tasks/id".to_string(),
            value: "Task100".to_string(),
            expected: "integer",
        };
        assert_eq!(
            err.to_string(),
            "value 'Task100' for property 'Tasks/id' is not a valid integer"
        );
    }

    #[test]
    fn translation_wraps_transparently() {
        let err = ResourceError::from(TranslationError::UnknownProperty {
            property_id: "Tasks/bogus".to_string(),
        });
        assert_eq!(err.to_string(), "unknown property 'Tasks/bogus'");
        assert!(!err.is_unsupported_operation());
    }

    #[test]
    fn unsupported_property_lists_ids() {
        let err = ResourceError::UnsupportedProperty {
            property_ids: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "unsupported properties requested: a, b");
    }

    #[test]
    fn operation_names() {
        assert_eq!(Operation::Create.to_string(), "create");
        assert_eq!(Operation::Update.to_string(), "update");
        assert_eq!(Operation::Delete.to_string(), "delete");
    }
}
