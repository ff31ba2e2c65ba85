//! One-shot scan of a model into the lookup tables completion works from.
//!
//! Building never fails. A single element that cannot be introspected is
//! skipped; a model that cannot be iterated at all yields an index carrying
//! only the static vocabulary.

use crate::limits::Limits;
use crate::vocabulary::Vocabulary;
use modelpeek_api::{ElementId, Model, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Guards the supertype walk against cyclic schemas.
const MAX_SUPERTYPE_DEPTH: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub types: usize,
    pub property_sets: usize,
    pub typed_attribute_sets: usize,
    pub sampled_attributes: usize,
    pub materials: usize,
    pub spatial_names: usize,
    pub type_objects: usize,
    pub degraded: bool,
}

/// Immutable snapshot of model structure. Rebuild it wholesale when the model changes.
#[derive(Debug, Clone)]
pub struct ModelIndex {
    vocabulary: Vocabulary,
    limits: Limits,
    types_in_model: BTreeSet<String>,
    properties_by_set: BTreeMap<String, BTreeSet<String>>,
    attribute_cache: BTreeMap<String, BTreeSet<String>>,
    sample_values: BTreeMap<String, BTreeSet<String>>,
    material_names: BTreeSet<String>,
    spatial_names: BTreeSet<String>,
    type_object_names: BTreeSet<String>,
    degraded: bool,
}

impl ModelIndex {
    /// Index holding nothing but the static vocabulary.
    pub fn static_only(vocabulary: Vocabulary, limits: Limits) -> Self {
        Self {
            vocabulary,
            limits,
            types_in_model: BTreeSet::new(),
            properties_by_set: BTreeMap::new(),
            attribute_cache: BTreeMap::new(),
            sample_values: BTreeMap::new(),
            material_names: BTreeSet::new(),
            spatial_names: BTreeSet::new(),
            type_object_names: BTreeSet::new(),
            degraded: true,
        }
    }

    pub fn build(model: &dyn Model, vocabulary: Vocabulary, limits: Limits) -> Self {
        let start = std::time::Instant::now();
        let elements = match model.iterate_elements() {
            Ok(elements) => elements,
            Err(e) => {
                tracing::warn!("Model cannot be iterated, completion uses static vocabulary only: {}", e);
                return Self::static_only(vocabulary, limits);
            }
        };

        let mut index = Self::static_only(vocabulary, limits);
        index.degraded = false;

        let samples = index.scan_elements(model, &elements);
        index.cache_attributes(model, &samples);
        index.cache_sample_values(model, samples.keys());
        index.cache_special_names(model);

        let stats = index.stats();
        tracing::info!(
            "Completion index built in {:?}: {} types, {} property sets, {} attribute sets",
            start.elapsed(),
            stats.types,
            stats.property_sets,
            stats.typed_attribute_sets
        );
        index
    }

    /// Records types (with ancestors) and property sets, and returns a capped
    /// instance sample per concrete type.
    fn scan_elements(
        &mut self,
        model: &dyn Model,
        elements: &[ElementId],
    ) -> BTreeMap<String, Vec<ElementId>> {
        let cap = self.limits.attribute_instances_per_type;
        let mut samples: BTreeMap<String, Vec<ElementId>> = BTreeMap::new();

        for &element in elements {
            let type_name = match model.type_name(element) {
                Ok(name) => name,
                Err(e) => {
                    tracing::debug!("Skipping element {}: {}", element, e);
                    continue;
                }
            };

            if !self.types_in_model.contains(&type_name) {
                self.types_in_model.insert(type_name.clone());
                self.add_ancestors(model, &type_name);
            }

            let sample = samples.entry(type_name).or_default();
            if sample.len() < cap {
                sample.push(element);
            }

            match model.property_sets(element) {
                Ok(psets) => {
                    for (set_name, properties) in psets {
                        let members = self.properties_by_set.entry(set_name).or_default();
                        members.extend(properties.into_keys().filter(|p| p != "id"));
                    }
                }
                Err(e) => tracing::debug!("Skipping property sets of {}: {}", element, e),
            }
        }

        samples
    }

    fn add_ancestors(&mut self, model: &dyn Model, type_name: &str) {
        let mut current = type_name.to_string();
        for _ in 0..MAX_SUPERTYPE_DEPTH {
            match model.supertype(&current) {
                Ok(Some(parent)) => {
                    if !self.types_in_model.insert(parent.clone()) {
                        // Chain above an already known type is already recorded.
                        return;
                    }
                    current = parent;
                }
                Ok(None) => return,
                Err(e) => {
                    tracing::debug!("Could not traverse hierarchy for {}: {}", current, e);
                    return;
                }
            }
        }
    }

    fn cache_attributes(&mut self, model: &dyn Model, samples: &BTreeMap<String, Vec<ElementId>>) {
        for (type_name, elements) in samples {
            let mut attributes = self.vocabulary.common_attributes.clone();
            for &element in elements {
                match model.attribute_names(element) {
                    Ok(names) => attributes.extend(
                        names
                            .into_iter()
                            .filter(|n| self.vocabulary.is_attribute_name(n)),
                    ),
                    Err(e) => tracing::debug!("Could not inspect {}: {}", element, e),
                }
            }
            self.attribute_cache.insert(type_name.clone(), attributes);
        }
    }

    fn cache_sample_values<'a>(
        &mut self,
        model: &dyn Model,
        types: impl Iterator<Item = &'a String>,
    ) {
        for type_name in types.take(self.limits.value_scan_types) {
            let elements = match model.elements_of_type(type_name) {
                Ok(elements) => elements,
                Err(e) => {
                    tracing::debug!("Could not list {} instances: {}", type_name, e);
                    continue;
                }
            };

            for &element in elements.iter().take(self.limits.value_scan_instances) {
                for attribute in &self.vocabulary.sampled_attributes {
                    let Ok(Some(value)) = model.get_attribute(element, attribute) else {
                        continue;
                    };
                    let Some(text) = self.clean_text(&value) else {
                        continue;
                    };
                    let values = self.sample_values.entry(attribute.clone()).or_default();
                    if values.len() < self.limits.values_per_attribute {
                        values.insert(text);
                    }
                }
            }
        }
    }

    fn cache_special_names(&mut self, model: &dyn Model) {
        self.material_names = self.collect_names(
            model,
            &self.vocabulary.material_types,
            self.limits.material_names,
            self.limits.material_names,
        );
        self.spatial_names = self.collect_names(
            model,
            &self.vocabulary.spatial_types,
            self.limits.spatial_names_per_type,
            usize::MAX,
        );
        self.type_object_names = self.collect_names(
            model,
            &self.vocabulary.type_object_types,
            self.limits.type_object_names_per_type,
            usize::MAX,
        );
    }

    fn collect_names(
        &self,
        model: &dyn Model,
        types: &[String],
        per_type: usize,
        total: usize,
    ) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for type_name in types {
            let elements = match model.elements_of_type(type_name) {
                Ok(elements) => elements,
                Err(e) => {
                    tracing::debug!("Could not cache {} names: {}", type_name, e);
                    continue;
                }
            };
            for &element in elements.iter().take(per_type) {
                if names.len() >= total {
                    return names;
                }
                if let Ok(Some(value)) = model.get_attribute(element, "Name") {
                    if let Some(name) = self.clean_text(&value) {
                        names.insert(name);
                    }
                }
            }
        }
        names
    }

    /// Trimmed, non-empty text short enough to offer as a literal.
    fn clean_text(&self, value: &Value) -> Option<String> {
        let text = value.as_str()?.trim();
        if text.is_empty() || text.chars().count() > self.limits.max_value_length {
            return None;
        }
        Some(text.to_string())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// True when the model could not be scanned at all.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Type names present in the model, ancestors included.
    pub fn types_in_model(&self) -> &BTreeSet<String> {
        &self.types_in_model
    }

    pub fn properties_by_set(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.properties_by_set
    }

    pub fn property_set_names(&self) -> impl Iterator<Item = &String> {
        self.properties_by_set.keys()
    }

    pub fn properties_of(&self, set_name: &str) -> Option<&BTreeSet<String>> {
        self.properties_by_set.get(set_name)
    }

    pub fn attribute_cache(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.attribute_cache
    }

    /// Attributes known for `type_name`, or the common baseline for unseen types.
    pub fn attributes_for_type(&self, type_name: &str) -> &BTreeSet<String> {
        self.attribute_cache
            .get(type_name)
            .unwrap_or(&self.vocabulary.common_attributes)
    }

    pub fn sample_values(&self, attribute: &str) -> Option<&BTreeSet<String>> {
        self.sample_values.get(attribute)
    }

    pub fn material_names(&self) -> &BTreeSet<String> {
        &self.material_names
    }

    pub fn spatial_names(&self) -> &BTreeSet<String> {
        &self.spatial_names
    }

    pub fn type_object_names(&self) -> &BTreeSet<String> {
        &self.type_object_names
    }

    /// Names a filter keyword is usually compared against.
    pub fn names_for_keyword(&self, keyword: &str) -> Option<&BTreeSet<String>> {
        match keyword {
            "material" => Some(&self.material_names),
            "location" | "parent" => Some(&self.spatial_names),
            "type" => Some(&self.type_object_names),
            _ => None,
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            types: self.types_in_model.len(),
            property_sets: self.properties_by_set.len(),
            typed_attribute_sets: self.attribute_cache.len(),
            sampled_attributes: self.sample_values.len(),
            materials: self.material_names.len(),
            spatial_names: self.spatial_names.len(),
            type_objects: self.type_object_names.len(),
            degraded: self.degraded,
        }
    }
}
