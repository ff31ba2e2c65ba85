//! JSON-backed [`Model`] used by the shell and the test suite.
//!
//! ```json
//! {
//!   "schema": { "IfcWall": "IfcBuildingElement", "IfcBuildingElement": null },
//!   "elements": [
//!     { "id": 1, "type": "IfcWall",
//!       "attributes": { "Name": "W1", "type": { "ref": 9 } },
//!       "property_sets": { "Pset_WallCommon": { "IsExternal": true } } }
//!   ]
//! }
//! ```

use crate::error::{PeekError, Result};
use indexmap::IndexMap;
use modelpeek_api::{ApiError, ApiResult, ElementId, Model, PropertySets, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

const MAX_SCHEMA_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    #[serde(default)]
    pub property_sets: PropertySets,
}

impl ElementRecord {
    pub fn new(id: u64, type_name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            type_name: type_name.into(),
            attributes: IndexMap::new(),
            property_sets: PropertySets::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn property(
        mut self,
        set_name: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.property_sets
            .entry(set_name.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct ModelFile {
    #[serde(default)]
    schema: BTreeMap<String, Option<String>>,
    #[serde(default)]
    elements: Vec<ElementRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    supertypes: BTreeMap<String, Option<String>>,
    elements: BTreeMap<ElementId, ElementRecord>,
}

impl MemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let model = Self::from_json(&content)?;
        info!(
            "Loaded {} elements from {}",
            model.elements.len(),
            path.display()
        );
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        let mut model = Self {
            supertypes: file.schema,
            elements: BTreeMap::new(),
        };
        for record in file.elements {
            let id = record.id;
            if model.elements.insert(id, record).is_some() {
                return Err(PeekError::Model(ApiError::InvalidArgument(format!(
                    "duplicate element {}",
                    id
                ))));
            }
        }
        Ok(model)
    }

    pub fn with_supertype(mut self, type_name: &str, supertype: Option<&str>) -> Self {
        self.supertypes
            .insert(type_name.to_string(), supertype.map(str::to_string));
        self
    }

    pub fn with_element(mut self, record: ElementRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&mut self, record: ElementRecord) {
        self.elements.insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn record(&self, element: ElementId) -> ApiResult<&ElementRecord> {
        self.elements
            .get(&element)
            .ok_or_else(|| ApiError::NotFound(format!("element {}", element)))
    }

    /// True when `type_name` is `ancestor` or declares it somewhere up the chain.
    fn is_a(&self, type_name: &str, ancestor: &str) -> bool {
        let mut current = Some(type_name);
        for _ in 0..MAX_SCHEMA_DEPTH {
            match current {
                Some(name) if name == ancestor => return true,
                Some(name) => {
                    current = self.supertypes.get(name).and_then(|s| s.as_deref());
                }
                None => return false,
            }
        }
        false
    }
}

impl Model for MemoryModel {
    fn iterate_elements(&self) -> ApiResult<Vec<ElementId>> {
        Ok(self.elements.keys().copied().collect())
    }

    fn type_name(&self, element: ElementId) -> ApiResult<String> {
        Ok(self.record(element)?.type_name.clone())
    }

    fn elements_of_type(&self, type_name: &str) -> ApiResult<Vec<ElementId>> {
        Ok(self
            .elements
            .values()
            .filter(|record| self.is_a(&record.type_name, type_name))
            .map(|record| record.id)
            .collect())
    }

    fn supertype(&self, type_name: &str) -> ApiResult<Option<String>> {
        Ok(self.supertypes.get(type_name).cloned().flatten())
    }

    fn attribute_names(&self, element: ElementId) -> ApiResult<Vec<String>> {
        Ok(self.record(element)?.attributes.keys().cloned().collect())
    }

    fn get_attribute(&self, element: ElementId, name: &str) -> ApiResult<Option<Value>> {
        Ok(self.record(element)?.attributes.get(name).cloned())
    }

    fn property_sets(&self, element: ElementId) -> ApiResult<PropertySets> {
        Ok(self.record(element)?.property_sets.clone())
    }
}
