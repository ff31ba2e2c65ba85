//! Next-segment candidates for a partially typed value path such as `type.`.
//!
//! The partial path is evaluated on a few sample elements and the shape of
//! whatever comes back decides what may follow it.

use crate::index::ModelIndex;
use modelpeek_api::{ElementId, Model, SelectorEvaluator, Shape, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Candidates for the segment after `partial_path`. Never empty: when no
/// sample yields a usable value the keyword baseline is returned.
pub fn resolve(
    model: &dyn Model,
    evaluator: &dyn SelectorEvaluator,
    index: &ModelIndex,
    elements: &[ElementId],
    partial_path: &str,
) -> BTreeSet<String> {
    let vocab = index.vocabulary();
    let sequence_cap = index.limits().sequence_indices;

    let results: Vec<Value> = elements
        .iter()
        .filter_map(|&element| match evaluator.get_value(model, element, partial_path) {
            Ok(value) if !value.is_null() => Some(value),
            Ok(_) => None,
            Err(e) => {
                debug!("path {} on {} failed: {}", partial_path, element, e);
                None
            }
        })
        .collect();

    if results.is_empty() {
        let mut fallback = vocab.value_keywords.clone();
        fallback.extend(vocab.common_attributes.iter().cloned());
        return fallback;
    }

    if results.iter().all(|v| v.shape() == Shape::Sequence) {
        return sequence_segments(&results, sequence_cap);
    }

    let mut candidates = vocab.value_keywords.clone();
    for value in &results {
        match value {
            Value::Element(reference) => match model.attribute_names(reference.id) {
                Ok(names) => candidates.extend(
                    names
                        .into_iter()
                        .filter(|name| vocab.is_attribute_name(name)),
                ),
                Err(e) => debug!("attributes of {} unavailable: {}", reference.id, e),
            },
            Value::Record(fields) => candidates.extend(fields.keys().cloned()),
            Value::List(_) => {
                candidates.extend(sequence_segments(std::slice::from_ref(value), sequence_cap))
            }
            _ => {}
        }
    }
    candidates
}

/// `count` plus the indices valid for the longest sequence, capped.
fn sequence_segments(values: &[Value], cap: usize) -> BTreeSet<String> {
    let longest = values
        .iter()
        .map(|v| match v {
            Value::List(items) => items.len(),
            _ => 0,
        })
        .max()
        .unwrap_or(0);

    std::iter::once("count".to_string())
        .chain((0..longest.min(cap)).map(|i| i.to_string()))
        .collect()
}
