//! Sampling caps shared by the index builder and the resolvers.
//!
//! Every scan is bounded by a fixed constant rather than by model size, so
//! index construction and per-keystroke work stay bounded on large models at
//! the price of completeness.

use serde::{Deserialize, Serialize};

/// Instances sampled per type when collecting attribute names.
pub const ATTRIBUTE_INSTANCES_PER_TYPE: usize = 3;
/// Distinct literal values kept per attribute.
pub const VALUES_PER_ATTRIBUTE: usize = 50;
/// Types visited when sampling literal values.
pub const VALUE_SCAN_TYPES: usize = 10;
/// Instances visited per type when sampling literal values.
pub const VALUE_SCAN_INSTANCES: usize = 20;
/// Longest string value (in characters) worth offering as a literal.
pub const MAX_VALUE_LENGTH: usize = 50;
pub const MATERIAL_NAMES: usize = 50;
pub const SPATIAL_NAMES_PER_TYPE: usize = 20;
pub const TYPE_OBJECT_NAMES_PER_TYPE: usize = 20;
/// Elements inspected after re-running a partial filter clause.
pub const FILTER_SAMPLE: usize = 100;
/// Elements inspected for value-clause completion.
pub const VALUE_SAMPLE: usize = 50;
/// Elements a partial value path is evaluated against.
pub const PATH_SAMPLE: usize = 10;
/// Highest sequence index offered is `SEQUENCE_INDICES - 1`.
pub const SEQUENCE_INDICES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub attribute_instances_per_type: usize,
    pub values_per_attribute: usize,
    pub value_scan_types: usize,
    pub value_scan_instances: usize,
    pub max_value_length: usize,
    pub material_names: usize,
    pub spatial_names_per_type: usize,
    pub type_object_names_per_type: usize,
    pub filter_sample: usize,
    pub value_sample: usize,
    pub path_sample: usize,
    pub sequence_indices: usize,
    /// Optional display cap on assembled candidates. Unset means every match is returned.
    pub max_candidates: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            attribute_instances_per_type: ATTRIBUTE_INSTANCES_PER_TYPE,
            values_per_attribute: VALUES_PER_ATTRIBUTE,
            value_scan_types: VALUE_SCAN_TYPES,
            value_scan_instances: VALUE_SCAN_INSTANCES,
            max_value_length: MAX_VALUE_LENGTH,
            material_names: MATERIAL_NAMES,
            spatial_names_per_type: SPATIAL_NAMES_PER_TYPE,
            type_object_names_per_type: TYPE_OBJECT_NAMES_PER_TYPE,
            filter_sample: FILTER_SAMPLE,
            value_sample: VALUE_SAMPLE,
            path_sample: PATH_SAMPLE,
            sequence_indices: SEQUENCE_INDICES,
            max_candidates: None,
        }
    }
}
