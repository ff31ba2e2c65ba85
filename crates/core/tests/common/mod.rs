use modelpeek_api::{ApiError, ApiResult, ElementId, Model, PropertySets, SelectorEvaluator, Value};
use modelpeek_core::{
    Candidate, CompletionEngine, ElementRecord, Limits, MemoryModel, ReferenceSelector, Vocabulary,
};
use std::sync::Arc;

/// Small building: three walls (one a subtype), a door, a window, two
/// materials, one wall type and one storey.
#[allow(dead_code)]
pub fn building_model() -> MemoryModel {
    MemoryModel::new()
        .with_supertype("IfcRoot", None)
        .with_supertype("IfcProduct", Some("IfcRoot"))
        .with_supertype("IfcElement", Some("IfcProduct"))
        .with_supertype("IfcBuildingElement", Some("IfcElement"))
        .with_supertype("IfcWall", Some("IfcBuildingElement"))
        .with_supertype("IfcWallStandardCase", Some("IfcWall"))
        .with_supertype("IfcDoor", Some("IfcBuildingElement"))
        .with_supertype("IfcWindow", Some("IfcBuildingElement"))
        .with_supertype("IfcSpatialStructureElement", Some("IfcProduct"))
        .with_supertype("IfcBuildingStorey", Some("IfcSpatialStructureElement"))
        .with_supertype("IfcTypeObject", Some("IfcRoot"))
        .with_supertype("IfcWallType", Some("IfcTypeObject"))
        .with_element(
            ElementRecord::new(1, "IfcWall")
                .attribute("Name", "Basic Wall")
                .attribute("Description", "Exterior")
                .attribute("GlobalId", "0aXb")
                .attribute("Tag", "W-01")
                .attribute("material", Value::element(20))
                .attribute("type", Value::element(30))
                .attribute("storey", Value::element(40))
                .property("Pset_WallCommon", "IsExternal", true)
                .property("Pset_WallCommon", "FireRating", "2HR")
                .property("Qto_WallBaseQuantities", "Length", 5.0),
        )
        .with_element(
            ElementRecord::new(2, "IfcWall")
                .attribute("Name", "Curtain Wall")
                .attribute("material", Value::element(21))
                .attribute("type", Value::element(30))
                .attribute("storey", Value::element(40))
                .property("Pset_WallCommon", "IsExternal", false)
                .property("Pset_WallCommon", "LoadBearing", true),
        )
        .with_element(
            ElementRecord::new(3, "IfcWallStandardCase")
                .attribute("Name", "Partition")
                .property("Pset_WallCommon", "FireRating", "1HR"),
        )
        .with_element(
            ElementRecord::new(10, "IfcDoor")
                .attribute("Name", "D1")
                .property("Pset_DoorCommon", "FireExit", true),
        )
        .with_element(
            ElementRecord::new(11, "IfcWindow")
                .attribute("Name", "Win1")
                .attribute("OverallHeight", 1.2),
        )
        .with_element(ElementRecord::new(20, "IfcMaterial").attribute("Name", "Concrete"))
        .with_element(ElementRecord::new(21, "IfcMaterial").attribute("Name", "Glass"))
        .with_element(
            ElementRecord::new(30, "IfcWallType")
                .attribute("Name", "WT-200")
                .attribute(
                    "Layers",
                    Value::List(vec![Value::element(20), Value::element(21)]),
                ),
        )
        .with_element(ElementRecord::new(40, "IfcBuildingStorey").attribute("Name", "Level 1"))
}

/// One instance each of `Wall`, `Window` and `Door`, no hierarchy.
#[allow(dead_code)]
pub fn three_type_model() -> MemoryModel {
    MemoryModel::new()
        .with_element(ElementRecord::new(1, "Wall").attribute("Name", "W"))
        .with_element(ElementRecord::new(2, "Window").attribute("Name", "Wi"))
        .with_element(ElementRecord::new(3, "Door").attribute("Name", "D"))
}

#[allow(dead_code)]
pub fn engine_for<M: Model + 'static>(model: M) -> CompletionEngine {
    engine_with(model, ReferenceSelector::default())
}

#[allow(dead_code)]
pub fn engine_with<M, S>(model: M, selector: S) -> CompletionEngine
where
    M: Model + 'static,
    S: SelectorEvaluator + 'static,
{
    CompletionEngine::new(
        Arc::new(model),
        Arc::new(selector),
        Vocabulary::default(),
        Limits::default(),
    )
}

#[allow(dead_code)]
pub fn texts(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.text.as_str()).collect()
}

/// Completes at the end of `text`.
#[allow(dead_code)]
pub fn complete_at_end(engine: &CompletionEngine, text: &str) -> Vec<Candidate> {
    engine.complete(text, text.chars().count())
}

fn corrupt<T>() -> ApiResult<T> {
    Err(ApiError::Internal("corrupt model".to_string()))
}

/// A model whose every operation fails.
#[allow(dead_code)]
pub struct UnreadableModel;

impl Model for UnreadableModel {
    fn iterate_elements(&self) -> ApiResult<Vec<ElementId>> {
        corrupt()
    }
    fn type_name(&self, _element: ElementId) -> ApiResult<String> {
        corrupt()
    }
    fn elements_of_type(&self, _type_name: &str) -> ApiResult<Vec<ElementId>> {
        corrupt()
    }
    fn supertype(&self, _type_name: &str) -> ApiResult<Option<String>> {
        corrupt()
    }
    fn attribute_names(&self, _element: ElementId) -> ApiResult<Vec<String>> {
        corrupt()
    }
    fn get_attribute(&self, _element: ElementId, _name: &str) -> ApiResult<Option<Value>> {
        corrupt()
    }
    fn property_sets(&self, _element: ElementId) -> ApiResult<PropertySets> {
        corrupt()
    }
}

/// Wraps a model and fails every lookup touching `broken`.
#[allow(dead_code)]
pub struct FlakyModel {
    pub inner: MemoryModel,
    pub broken: ElementId,
}

impl FlakyModel {
    fn check(&self, element: ElementId) -> ApiResult<()> {
        if element == self.broken {
            corrupt()
        } else {
            Ok(())
        }
    }
}

impl Model for FlakyModel {
    fn iterate_elements(&self) -> ApiResult<Vec<ElementId>> {
        self.inner.iterate_elements()
    }
    fn type_name(&self, element: ElementId) -> ApiResult<String> {
        self.check(element)?;
        self.inner.type_name(element)
    }
    fn elements_of_type(&self, type_name: &str) -> ApiResult<Vec<ElementId>> {
        self.inner.elements_of_type(type_name)
    }
    fn supertype(&self, type_name: &str) -> ApiResult<Option<String>> {
        self.inner.supertype(type_name)
    }
    fn attribute_names(&self, element: ElementId) -> ApiResult<Vec<String>> {
        self.check(element)?;
        self.inner.attribute_names(element)
    }
    fn get_attribute(&self, element: ElementId, name: &str) -> ApiResult<Option<Value>> {
        self.check(element)?;
        self.inner.get_attribute(element, name)
    }
    fn property_sets(&self, element: ElementId) -> ApiResult<PropertySets> {
        self.check(element)?;
        self.inner.property_sets(element)
    }
}

/// An evaluator that rejects every filter and path.
#[allow(dead_code)]
pub struct BrokenSelector;

impl SelectorEvaluator for BrokenSelector {
    fn filter(&self, _model: &dyn Model, filter_clause: &str) -> ApiResult<Vec<ElementId>> {
        Err(ApiError::evaluation(format!("cannot evaluate {}", filter_clause)))
    }
    fn get_value(&self, _model: &dyn Model, _element: ElementId, path: &str) -> ApiResult<Value> {
        Err(ApiError::evaluation(format!("cannot read {}", path)))
    }
}
