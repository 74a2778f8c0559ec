//! Storage accessor for persisted task records.
//!
//! The [`TaskStore`] trait is the only seam between the resource provider and
//! persistence. It answers a [`TaskQuery`] already expressed in the record's
//! own vocabulary; it knows nothing about property identifiers.
//!
//! Implementations must be safe to share across concurrent reads.
//! [`InMemoryTaskStore`](memory::InMemoryTaskStore) is the bundled one.

pub mod memory;

use std::fmt;

use async_trait::async_trait;

use crate::domain::TaskRecord;
use crate::query::TaskQuery;

pub use memory::InMemoryTaskStore;

/// Errors raised by a [`TaskStore`].
///
/// The resource provider passes these through to its caller unchanged.
///
/// # Examples
///
/// ```
/// use task_resources::store::StorageError;
///
/// let err = StorageError::unavailable("connection pool exhausted");
/// assert_eq!(err.to_string(), "storage unavailable: connection pool exhausted");
/// ```
#[derive(Debug)]
pub enum StorageError {
    /// The store cannot currently serve queries.
    Unavailable {
        /// Human-readable description.
        message: String,
    },

    /// The query failed inside the store.
    Backend {
        /// Human-readable description.
        message: String,
        /// The underlying error, if available. Accessible via
        /// [`std::error::Error::source()`].
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StorageError {
    /// Shorthand for [`StorageError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Shorthand for [`StorageError::Backend`] wrapping `source`.
    pub fn backend<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { message } => write!(f, "storage unavailable: {message}"),
            Self::Backend { message, .. } => write!(f, "backend error: {message}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Read access to persisted task records.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use task_resources::domain::TaskRecord;
/// use task_resources::query::TaskQuery;
/// use task_resources::store::{StorageError, TaskStore};
///
/// struct Fixed(Vec<TaskRecord>);
///
/// #[async_trait]
/// impl TaskStore for Fixed {
///     async fn find_matching(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>, StorageError> {
///         Ok(query.execute(&self.0))
///     }
/// }
/// ```
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns the records matching `query`, filtered, ordered and paged as
    /// it specifies.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot answer.
    async fn find_matching(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>, StorageError>;
}
