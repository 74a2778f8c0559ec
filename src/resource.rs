//! Resources and the requests that read or mutate them.
//!
//! A [`Resource`] is a flat map of property identifier to [`PropertyValue`],
//! tagged with its [`ResourceType`]. Property order follows the provider's
//! property table, so serialized output is stable.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::constants::{TASK_ID_PROPERTY_ID, TASK_REQUEST_ID_PROPERTY_ID};
use crate::query::{PageRequest, SortRequest};
use crate::value::PropertyValue;

/// Kind of resource a provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceType {
    /// A task run by an agent on a host.
    Task,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => f.write_str("Task"),
        }
    }
}

/// Property identifier to value.
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// Result of a read.
pub type ResourceSet = Vec<Resource>;

/// One resource instance.
///
/// # Examples
///
/// ```
/// use task_resources::resource::{Resource, ResourceType};
///
/// let resource = Resource::new(ResourceType::Task);
/// assert!(resource.is_empty());
/// assert_eq!(resource.identity(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(rename = "type")]
    resource_type: ResourceType,
    properties: PropertyMap,
}

impl Resource {
    /// An empty resource of the given type.
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            properties: PropertyMap::new(),
        }
    }

    /// The resource's type.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Value of one property. `None` when the property was not requested.
    pub fn get(&self, property_id: &str) -> Option<&PropertyValue> {
        self.properties.get(property_id)
    }

    /// Returns `true` if the property was populated.
    pub fn contains(&self, property_id: &str) -> bool {
        self.properties.contains_key(property_id)
    }

    /// Number of populated properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no property was populated.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// All populated properties, in table order.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// `(request_id, task_id)` when both key properties are populated.
    pub fn identity(&self) -> Option<(i64, i64)> {
        let request_id = self.get(TASK_REQUEST_ID_PROPERTY_ID)?.as_i64()?;
        let task_id = self.get(TASK_ID_PROPERTY_ID)?.as_i64()?;
        Some((request_id, task_id))
    }

    pub(crate) fn set(&mut self, property_id: impl Into<String>, value: PropertyValue) {
        self.properties.insert(property_id.into(), value);
    }
}

/// Parameters of a read.
///
/// An empty `property_ids` requests every property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadRequest {
    /// Property identifiers or categories to populate.
    pub property_ids: Vec<String>,
    /// Result order, most significant first.
    pub sort: Vec<SortRequest>,
    /// Result window.
    pub page: Option<PageRequest>,
}

impl ReadRequest {
    /// A request for every property.
    pub fn all() -> Self {
        Self::default()
    }

    /// A request for the given properties.
    pub fn with_properties<I, S>(property_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            property_ids: property_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds a sort key.
    pub fn sort_by(mut self, sort: SortRequest) -> Self {
        self.sort.push(sort);
        self
    }

    /// Sets the result window.
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }
}

/// Parameters of a create: one property map per resource to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateRequest {
    /// Properties of each resource, one map per resource.
    pub properties: Vec<PropertyMap>,
}

impl CreateRequest {
    /// Creates a request for the given resources.
    pub fn new(properties: Vec<PropertyMap>) -> Self {
        Self { properties }
    }
}

/// Parameters of an update: the properties to set on every matching resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    /// Property values to apply.
    pub properties: PropertyMap,
}

impl UpdateRequest {
    /// Creates a request setting `properties`.
    pub fn new(properties: PropertyMap) -> Self {
        Self { properties }
    }
}
