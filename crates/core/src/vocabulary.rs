//! Static domain vocabulary: keywords, operators and naming conventions that
//! hold for every model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const VALUE_KEYWORDS: &[&str] = &[
    "id",
    "class",
    "predefined_type",
    "type",
    "types",
    "occurrences",
    "container",
    "space",
    "storey",
    "building",
    "site",
    "parent",
    "classification",
    "group",
    "system",
    "zone",
    "material",
    "mat",
    "item",
    "i",
    "materials",
    "mats",
    "profiles",
    "x",
    "y",
    "z",
    "easting",
    "northing",
    "elevation",
    "count",
];

const FILTER_KEYWORDS: &[&str] = &[
    "material",
    "type",
    "location",
    "parent",
    "classification",
    "query",
];

const COMMON_ATTRIBUTES: &[&str] = &[
    "Name",
    "Description",
    "GlobalId",
    "Tag",
    "ObjectType",
    "PredefinedType",
    "Width",
    "Height",
    "Length",
    "Thickness",
];

/// Longest operators first so that prefix scans pick `>=` over `>`.
pub const COMPARISON_OPERATORS: &[&str] = &["!*=", ">=", "<=", "!=", "*=", ">", "<", "="];

const SAMPLED_ATTRIBUTES: &[&str] = &["Name", "Description", "Tag", "ObjectType", "PredefinedType"];

const PROPERTY_SET_PREFIXES: &[&str] = &["Pset_", "Qto_", "EPset_"];

const KEYWORD_VALUE_PATHS: &[(&str, &str)] = &[
    ("material", "material.Name"),
    ("type", "type.Name"),
    ("location", "storey.Name"),
    ("parent", "container.Name"),
    ("classification", "classification.Identification"),
];

const MATERIAL_TYPES: &[&str] = &["IfcMaterial"];
const SPATIAL_TYPES: &[&str] = &["IfcSite", "IfcBuilding", "IfcBuildingStorey", "IfcSpace"];
const TYPE_OBJECT_TYPES: &[&str] = &["IfcWallType", "IfcDoorType", "IfcWindowType", "IfcSlabType"];

pub const TRUE_LITERAL: &str = "TRUE";
pub const FALSE_LITERAL: &str = "FALSE";

/// User-supplied additions to the built-in vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyOverrides {
    pub extra_common_attributes: Vec<String>,
    pub extra_property_set_prefixes: Vec<String>,
    pub material_types: Option<Vec<String>>,
    pub spatial_types: Option<Vec<String>>,
    pub type_object_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub value_keywords: BTreeSet<String>,
    pub filter_keywords: BTreeSet<String>,
    pub common_attributes: BTreeSet<String>,
    pub comparison_operators: BTreeSet<String>,
    pub sampled_attributes: Vec<String>,
    pub property_set_prefixes: Vec<String>,
    pub keyword_value_paths: BTreeMap<String, String>,
    pub material_types: Vec<String>,
    pub spatial_types: Vec<String>,
    pub type_object_types: Vec<String>,
}

fn owned_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn owned_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            value_keywords: owned_set(VALUE_KEYWORDS),
            filter_keywords: owned_set(FILTER_KEYWORDS),
            common_attributes: owned_set(COMMON_ATTRIBUTES),
            comparison_operators: owned_set(COMPARISON_OPERATORS),
            sampled_attributes: owned_vec(SAMPLED_ATTRIBUTES),
            property_set_prefixes: owned_vec(PROPERTY_SET_PREFIXES),
            keyword_value_paths: KEYWORD_VALUE_PATHS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            material_types: owned_vec(MATERIAL_TYPES),
            spatial_types: owned_vec(SPATIAL_TYPES),
            type_object_types: owned_vec(TYPE_OBJECT_TYPES),
        }
    }
}

impl Vocabulary {
    pub fn with_overrides(overrides: &VocabularyOverrides) -> Self {
        let mut vocab = Self::default();
        vocab
            .common_attributes
            .extend(overrides.extra_common_attributes.iter().cloned());
        for prefix in &overrides.extra_property_set_prefixes {
            if !prefix.is_empty() && !vocab.property_set_prefixes.contains(prefix) {
                vocab.property_set_prefixes.push(prefix.clone());
            }
        }
        if let Some(types) = &overrides.material_types {
            vocab.material_types = types.clone();
        }
        if let Some(types) = &overrides.spatial_types {
            vocab.spatial_types = types.clone();
        }
        if let Some(types) = &overrides.type_object_types {
            vocab.type_object_types = types.clone();
        }
        vocab
    }

    /// Schema attributes are capitalized; lowercase names are relations and keywords.
    pub fn is_attribute_name(&self, name: &str) -> bool {
        name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
    }

    /// `Wall`, `IfcBuildingStorey`: an identifier starting with an uppercase letter.
    pub fn is_type_like(&self, token: &str) -> bool {
        let mut chars = token.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// A complete property-set name such as `Pset_WallCommon` or `Custom_Data`.
    pub fn is_property_set_name(&self, name: &str) -> bool {
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
        if self
            .property_set_prefixes
            .iter()
            .any(|p| name.starts_with(p.as_str()))
        {
            return true;
        }
        // `Word_Word` shape used by vendor-specific sets.
        match name.split_once('_') {
            Some((head, tail)) => {
                self.is_type_like(head) && !tail.is_empty() && !tail.starts_with('_')
            }
            None => false,
        }
    }

    /// A property-set name being typed: `P`, `Qt`, `Pset_`, `Pset_Wa`.
    pub fn is_property_set_prefix(&self, token: &str) -> bool {
        !token.is_empty()
            && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && self
                .property_set_prefixes
                .iter()
                .any(|p| p.starts_with(token) || token.starts_with(p.as_str()))
    }

    /// Keywords and attributes that are followed by a comparison operator.
    pub fn is_comparable_keyword(&self, token: &str) -> bool {
        self.filter_keywords.contains(token) || self.common_attributes.contains(token)
    }

    /// Value path used to read the values a filter keyword compares against.
    pub fn value_path_for<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.keyword_value_paths
            .get(attribute)
            .map(String::as_str)
            .unwrap_or(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_set_naming() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_property_set_name("Pset_WallCommon"));
        assert!(vocab.is_property_set_name("Qto_WallBaseQuantities"));
        assert!(vocab.is_property_set_name("Custom_Data"));
        assert!(!vocab.is_property_set_name("Name"));
        assert!(!vocab.is_property_set_name("type"));

        assert!(vocab.is_property_set_prefix("P"));
        assert!(vocab.is_property_set_prefix("Qto"));
        assert!(vocab.is_property_set_prefix("Pset_Wa"));
        assert!(vocab.is_property_set_prefix("E"));
        assert!(!vocab.is_property_set_prefix("Pr"));
        assert!(!vocab.is_property_set_prefix(""));
    }

    #[test]
    fn test_type_like_tokens() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_type_like("Wall"));
        assert!(vocab.is_type_like("IfcWallStandardCase"));
        assert!(!vocab.is_type_like("wall"));
        assert!(!vocab.is_type_like("Wall.Name"));
        assert!(!vocab.is_type_like(""));
    }

    #[test]
    fn test_overrides_extend_defaults() {
        let overrides = VocabularyOverrides {
            extra_common_attributes: vec!["LongName".to_string()],
            extra_property_set_prefixes: vec!["BIM_".to_string()],
            material_types: Some(vec!["Material".to_string()]),
            ..Default::default()
        };
        let vocab = Vocabulary::with_overrides(&overrides);
        assert!(vocab.common_attributes.contains("LongName"));
        assert!(vocab.common_attributes.contains("Name"));
        assert!(vocab.is_property_set_prefix("BIM_"));
        assert_eq!(vocab.material_types, vec!["Material".to_string()]);
        assert_eq!(vocab.spatial_types.len(), 4);
    }

    #[test]
    fn test_keyword_value_paths() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.value_path_for("material"), "material.Name");
        assert_eq!(vocab.value_path_for("Name"), "Name");
    }
}
