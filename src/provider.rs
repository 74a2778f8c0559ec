//! The task resource provider.
//!
//! [`TaskResourceProvider`] assembles read-only [`Resource`]s from persisted
//! [`TaskRecord`]s. A read runs in four steps:
//!
//! 1. resolve the requested property ids through the [`PropertyTable`],
//! 2. translate the predicate and sort keys into a [`TaskQuery`],
//! 3. issue exactly one [`TaskStore::find_matching`] call,
//! 4. project every returned record onto the selected properties.
//!
//! Steps 1 and 2 fail before the store is touched. A store failure fails the
//! whole read. A structured output payload that does not decode only turns
//! that one property into `null`.
//!
//! Task lifecycle belongs to the orchestration engine, so create, update and
//! delete are refused without any I/O.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::domain::{FieldValue, TaskRecord};
use crate::error::{Operation, ResourceError};
use crate::predicate::Predicate;
use crate::property::{PropertyDefinition, PropertyTable, PropertyType};
use crate::query::{PageRequest, PredicateTranslator, TaskQuery};
use crate::resource::{
    CreateRequest, ReadRequest, Resource, ResourceSet, ResourceType, UpdateRequest,
};
use crate::store::TaskStore;
use crate::structured_output::parse_structured_output;
use crate::value::PropertyValue;

/// Transport-agnostic contract of a resource provider.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// The resource type served.
    fn resource_type(&self) -> ResourceType;

    /// Every property id a resource of this type may carry.
    fn property_ids(&self) -> Vec<&'static str>;

    /// Property ids forming the resource key.
    fn key_property_ids(&self) -> Vec<&'static str>;

    /// Creates one resource per property map.
    async fn create(&self, request: &CreateRequest) -> Result<ResourceSet, ResourceError>;

    /// Returns the resources matching `predicate`; `None` matches everything.
    async fn read(
        &self,
        request: &ReadRequest,
        predicate: Option<&Predicate>,
    ) -> Result<ResourceSet, ResourceError>;

    /// Applies `request` to the resources matching `predicate`.
    async fn update(
        &self,
        request: &UpdateRequest,
        predicate: Option<&Predicate>,
    ) -> Result<ResourceSet, ResourceError>;

    /// Removes the resources matching `predicate`.
    async fn delete(&self, predicate: Option<&Predicate>) -> Result<ResourceSet, ResourceError>;
}

/// Read-only provider for [`ResourceType::Task`].
///
/// Holds no mutable state; one instance can serve concurrent reads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use task_resources::config::ProviderConfig;
/// use task_resources::provider::TaskResourceProvider;
/// use task_resources::store::InMemoryTaskStore;
///
/// let provider = TaskResourceProvider::new(Arc::new(InMemoryTaskStore::new()))
///     .with_config(ProviderConfig::default().with_max_results(100));
/// assert_eq!(provider.config().max_results, Some(100));
/// ```
pub struct TaskResourceProvider {
    store: Arc<dyn TaskStore>,
    table: &'static PropertyTable,
    config: ProviderConfig,
}

impl std::fmt::Debug for TaskResourceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskResourceProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TaskResourceProvider {
    /// Creates a provider reading from `store`.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            table: PropertyTable::tasks(),
            config: ProviderConfig::default(),
        }
    }

    /// Sets the provider configuration.
    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn refuse(&self, operation: Operation) -> Result<ResourceSet, ResourceError> {
        tracing::debug!(%operation, "refusing task mutation");
        Err(ResourceError::UnsupportedOperation {
            operation,
            resource_type: ResourceType::Task,
        })
    }

    fn select(
        &self,
        request: &ReadRequest,
    ) -> Result<Vec<&'static PropertyDefinition>, ResourceError> {
        let selection = self.table.select(request.property_ids.as_slice());
        if !selection.unknown.is_empty() {
            if self.config.reject_unknown_properties {
                return Err(ResourceError::UnsupportedProperty {
                    property_ids: selection.unknown,
                });
            }
            tracing::debug!(unknown = ?selection.unknown, "ignoring unknown task properties");
        }
        Ok(selection.definitions)
    }

    fn page(&self, requested: Option<PageRequest>) -> Option<PageRequest> {
        let Some(max) = self.config.max_results else {
            return requested;
        };
        let page = requested.unwrap_or_default();
        Some(PageRequest {
            offset: page.offset,
            limit: Some(page.limit.map_or(max, |limit| limit.min(max))),
        })
    }

    fn build_query(
        &self,
        request: &ReadRequest,
        predicate: Option<&Predicate>,
    ) -> Result<TaskQuery, ResourceError> {
        let translator = PredicateTranslator::new(self.table);
        let query = translator.build_query(predicate, &request.sort, self.page(request.page))?;
        Ok(query)
    }

    fn project(record: &TaskRecord, selected: &[&PropertyDefinition]) -> Resource {
        let mut resource = Resource::new(ResourceType::Task);
        for definition in selected {
            resource.set(definition.id, property_value(record, definition));
        }
        resource
    }
}

fn property_value(record: &TaskRecord, definition: &PropertyDefinition) -> PropertyValue {
    if definition.property_type == PropertyType::Structured {
        return structured_output_value(record);
    }
    match record.field(definition.field) {
        Some(FieldValue::Integer(v)) => PropertyValue::Integer(v),
        Some(FieldValue::Text(v)) => PropertyValue::String(v),
        Some(FieldValue::Status(v)) => PropertyValue::from(v.as_str()),
        Some(FieldValue::Command(v)) => PropertyValue::from(v.as_str()),
        None => PropertyValue::Null,
    }
}

fn structured_output_value(record: &TaskRecord) -> PropertyValue {
    match parse_structured_output(record.structured_out.as_deref()) {
        Ok(Some(value)) => value,
        Ok(None) => PropertyValue::Null,
        Err(error) => {
            tracing::warn!(
                request_id = record.request_id,
                task_id = record.task_id,
                error = %error,
                "structured output did not decode; returning null"
            );
            PropertyValue::Null
        },
    }
}

#[async_trait]
impl ResourceProvider for TaskResourceProvider {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Task
    }

    fn property_ids(&self) -> Vec<&'static str> {
        self.table.property_ids()
    }

    fn key_property_ids(&self) -> Vec<&'static str> {
        self.table.key_property_ids()
    }

    async fn create(&self, _request: &CreateRequest) -> Result<ResourceSet, ResourceError> {
        self.refuse(Operation::Create)
    }

    async fn read(
        &self,
        request: &ReadRequest,
        predicate: Option<&Predicate>,
    ) -> Result<ResourceSet, ResourceError> {
        let selected = self.select(request)?;
        let query = self.build_query(request, predicate)?;
        tracing::debug!(
            properties = selected.len(),
            filter = ?query.filter.as_ref().map(ToString::to_string),
            "reading tasks"
        );

        let records = match self.store.find_matching(&query).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(error = %error, "task query failed");
                return Err(error.into());
            },
        };

        Ok(records
            .iter()
            .map(|record| Self::project(record, &selected))
            .collect())
    }

    async fn update(
        &self,
        _request: &UpdateRequest,
        _predicate: Option<&Predicate>,
    ) -> Result<ResourceSet, ResourceError> {
        self.refuse(Operation::Update)
    }

    async fn delete(&self, _predicate: Option<&Predicate>) -> Result<ResourceSet, ResourceError> {
        self.refuse(Operation::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::domain::{HostRoleStatus, RoleCommand};
    use crate::store::InMemoryTaskStore;
    use pretty_assertions::assert_eq;

    fn provider_with(records: Vec<TaskRecord>) -> TaskResourceProvider {
        let store: InMemoryTaskStore = records.into_iter().collect();
        TaskResourceProvider::new(Arc::new(store))
    }

    #[test]
    fn page_clamped_by_max_results() {
        let provider =
            provider_with(vec![]).with_config(ProviderConfig::default().with_max_results(10));
        assert_eq!(provider.page(None), Some(PageRequest::new(0, 10)));
        assert_eq!(
            provider.page(Some(PageRequest::new(5, 50))),
            Some(PageRequest::new(5, 10))
        );
        assert_eq!(
            provider.page(Some(PageRequest::new(5, 3))),
            Some(PageRequest::new(5, 3))
        );
        assert_eq!(
            provider.page(Some(PageRequest {
                offset: 2,
                limit: None
            })),
            Some(PageRequest::new(2, 10))
        );
    }

    #[test]
    fn page_untouched_without_max_results() {
        let provider = provider_with(vec![]);
        assert_eq!(provider.page(None), None);
        assert_eq!(
            provider.page(Some(PageRequest::new(1, 2))),
            Some(PageRequest::new(1, 2))
        );
    }

    #[test]
    fn enum_columns_project_as_names() {
        let record = TaskRecord::new(1, 1, 1, "DATANODE")
            .with_status(HostRoleStatus::InProgress)
            .with_command(RoleCommand::CustomCommand);
        let table = PropertyTable::tasks();
        let status = table.get(TASK_STATUS_PROPERTY_ID).unwrap();
        let command = table.get(TASK_COMMAND_PROPERTY_ID).unwrap();
        assert_eq!(property_value(&record, status), PropertyValue::from("IN_PROGRESS"));
        assert_eq!(property_value(&record, command), PropertyValue::from("CUSTOM_COMMAND"));
    }

    #[test]
    fn absent_structured_output_is_null() {
        let record = TaskRecord::new(1, 1, 1, "DATANODE");
        assert_eq!(structured_output_value(&record), PropertyValue::Null);
        let record = record.with_structured_out("");
        assert_eq!(structured_output_value(&record), PropertyValue::Null);
    }

    #[tokio::test]
    async fn lenient_config_drops_unknown_properties() {
        let provider = provider_with(vec![TaskRecord::new(1, 2, 3, "DATANODE")])
            .with_config(ProviderConfig::default().with_reject_unknown_properties(false));
        let request = ReadRequest::with_properties([TASK_ID_PROPERTY_ID, "Tasks/bogus"]);
        let resources = provider.read(&request, None).await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].len(), 1);
        assert_eq!(resources[0].get(TASK_ID_PROPERTY_ID), Some(&PropertyValue::Integer(2)));
    }
}
