//! Read-only resource provider for orchestration task records.
//!
//! Exposes the tasks run by an orchestration engine as generic property-bag
//! resources (`Tasks/id`, `Tasks/status`, `Tasks/structured_out`, ...),
//! filtered by predicates over property identifiers.
//!
//! # Overview
//!
//! A read resolves the requested properties, translates the caller's
//! [`Predicate`] into a storage-native [`TaskQuery`], asks a [`TaskStore`]
//! for matching records, and projects each record into a [`Resource`]. The
//! structured output a task reports is decoded into a nested
//! [`PropertyValue`] on the way out.
//!
//! Task lifecycle is owned by the orchestration engine: create, update and
//! delete always fail with [`ResourceError::UnsupportedOperation`].
//!
//! # Module Organization
//!
//! - [`provider`] - [`ResourceProvider`] trait and [`TaskResourceProvider`]
//! - [`property`] - Property projection table
//! - [`predicate`] - Generic filter predicates
//! - [`query`] - Storage-native queries and the predicate translator
//! - [`store`] - Storage accessor trait and the in-memory store
//! - [`structured_output`] - Structured output decoding
//! - [`value`] - Nested property values
//! - [`error`] - Error types
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use task_resources::constants::*;
//! use task_resources::{
//!     InMemoryTaskStore, Predicate, PropertyValue, ReadRequest, ResourceProvider, TaskRecord,
//!     TaskResourceProvider,
//! };
//!
//! # tokio_test_block(async {
//! let store = InMemoryTaskStore::new();
//! store.upsert(
//!     TaskRecord::new(100, 100, 100, "DATANODE")
//!         .with_structured_out(r#"{"host_resolution_check": {"failed_count": 1}}"#),
//! );
//!
//! let provider = TaskResourceProvider::new(Arc::new(store));
//! let predicate = Predicate::property(TASK_ID_PROPERTY_ID).equals("100");
//! let request = ReadRequest::with_properties([TASK_STRUCTURED_OUT_PROPERTY_ID]);
//! let resources = provider.read(&request, Some(&predicate)).await.unwrap();
//!
//! let structured = resources[0].get(TASK_STRUCTURED_OUT_PROPERTY_ID).unwrap();
//! assert_eq!(
//!     structured.pointer("/host_resolution_check/failed_count"),
//!     Some(&PropertyValue::Integer(1))
//! );
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod predicate;
pub mod property;
pub mod provider;
pub mod query;
pub mod resource;
pub mod store;
pub mod structured_output;
pub mod value;

// Re-exports for ergonomic access
pub use config::ProviderConfig;
pub use domain::{HostRoleStatus, RoleCommand, TaskRecord};
pub use error::{ResourceError, TranslationError};
pub use predicate::Predicate;
pub use property::PropertyTable;
pub use provider::{ResourceProvider, TaskResourceProvider};
pub use query::{PageRequest, SortRequest, TaskQuery};
pub use resource::{ReadRequest, Resource, ResourceType};
pub use store::{InMemoryTaskStore, StorageError, TaskStore};
pub use value::PropertyValue;
