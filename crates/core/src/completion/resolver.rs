//! Candidate resolvers, one per sub-kind.
//!
//! Live resolvers evaluate the filter typed so far against the model and read
//! names off a capped sample of the matches. Any failure along the way drops
//! that contribution; the static part of the answer is always returned.

use super::context::{CompletionContext, SubKind};
use super::path;
use crate::index::ModelIndex;
use crate::vocabulary::{FALSE_LITERAL, TRUE_LITERAL};
use modelpeek_api::{ApiResult, ElementId, Model, SelectorEvaluator, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

const OPERATOR: &str = r"(?:!\*=|>=|<=|!=|\*=|>|<|=)";
const PARTIAL_LITERAL: &str = r#"(?:"[^"]*|[^\s",+]*)"#;

static COMMA_THEN_SET_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?),\s*[A-Za-z_]\w*\.\w*$").expect("valid regex"));
static TRAILING_SET_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_]\w*\.\w*$").expect("valid regex"));
static COMMA_THEN_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(.+?),\s*[A-Za-z_][\w.]*\s*{}\s*{}$",
        OPERATOR, PARTIAL_LITERAL
    ))
    .expect("valid regex")
});
static SPACE_THEN_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(.+?)\s+[A-Za-z_][\w.]*\s*{}\s*{}$",
        OPERATOR, PARTIAL_LITERAL
    ))
    .expect("valid regex")
});
static TRAILING_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"[A-Za-z_][\w.]*\s*{}\s*{}$",
        OPERATOR, PARTIAL_LITERAL
    ))
    .expect("valid regex")
});
static CONTAINS_OPERATOR: Lazy<Regex> = Lazy::new(|| Regex::new(OPERATOR).expect("valid regex"));

/// Collapses a failed live evaluation into an empty contribution.
fn or_empty<T: Default>(result: ApiResult<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        debug!("live completion lookup failed ({}): {}", what, e);
        T::default()
    })
}

/// Longest prefix of `text` that forms a complete filter: a trailing
/// fragment after the last comma is dropped unless it already stands on its
/// own (a comparison, a property reference, a keyword or a known type).
pub fn narrowing_filter(index: &ModelIndex, text: &str) -> String {
    let text = text.trim();
    let Some((before, last)) = text.rsplit_once(',') else {
        return text.to_string();
    };
    let last = last.trim();
    let vocab = index.vocabulary();

    let complete = !last.is_empty()
        && (CONTAINS_OPERATOR.is_match(last)
            || last
                .split_once('.')
                .is_some_and(|(set, _)| vocab.is_property_set_name(set))
            || vocab.filter_keywords.contains(last)
            || index.types_in_model().contains(last.trim_start_matches('!')));

    if complete {
        text.to_string()
    } else {
        before.trim().to_string()
    }
}

/// Filter preceding a trailing `Set.partial` reference.
pub fn filter_before_set_reference(index: &ModelIndex, text: &str) -> String {
    if let Some(caps) = COMMA_THEN_SET_REFERENCE.captures(text.trim_end()) {
        return caps[1].trim().to_string();
    }
    let stripped = TRAILING_SET_REFERENCE.replace(text.trim_end(), "");
    narrowing_filter(index, &stripped)
}

/// Filter preceding a trailing `attribute<op>partial` fragment.
pub fn filter_before_comparison(index: &ModelIndex, text: &str) -> String {
    let text = text.trim_start();
    for pattern in [&*COMMA_THEN_COMPARISON, &*SPACE_THEN_COMPARISON] {
        if let Some(caps) = pattern.captures(text) {
            return caps[1].trim().to_string();
        }
    }
    let stripped = TRAILING_COMPARISON.replace(text, "");
    narrowing_filter(index, &stripped)
}

fn quote(text: &str) -> Option<String> {
    (!text.contains('"')).then(|| format!("\"{}\"", text))
}

pub struct Resolver<'a> {
    model: &'a dyn Model,
    evaluator: &'a dyn SelectorEvaluator,
    index: &'a ModelIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(
        model: &'a dyn Model,
        evaluator: &'a dyn SelectorEvaluator,
        index: &'a ModelIndex,
    ) -> Self {
        Self {
            model,
            evaluator,
            index,
        }
    }

    /// Unfiltered candidate strings for `ctx`.
    pub fn candidates(&self, ctx: &CompletionContext) -> BTreeSet<String> {
        let vocab = self.index.vocabulary();
        let text = ctx.text_before_cursor.as_str();

        match &ctx.subkind {
            SubKind::ExpectingClass => self.index.types_in_model().clone(),
            SubKind::ExpectingAttributeOrKeyword => self.attribute_or_keyword(text),
            SubKind::ExpectingPropertySetName => {
                let before_word = text
                    .strip_suffix(ctx.current_word.as_str())
                    .unwrap_or(text);
                let filter = narrowing_filter(self.index, before_word);
                let elements = self.sample(&filter, self.index.limits().filter_sample);
                self.set_names_or_indexed(&elements)
            }
            SubKind::ExpectingPropertyName { property_set } => {
                let filter = filter_before_set_reference(self.index, text);
                let elements = self.sample(&filter, self.index.limits().filter_sample);
                self.properties_or_indexed(&elements, property_set)
            }
            SubKind::ExpectingComparisonOperator { .. } => vocab.comparison_operators.clone(),
            SubKind::ExpectingAttributeValue { attribute } => {
                self.attribute_values(text, attribute)
            }
            SubKind::ExpectingValuePathSegment => self.value_path(ctx),
            SubKind::ExpectingValuePropertySetName => {
                let elements = self.value_sample(ctx, self.index.limits().value_sample);
                self.set_names_or_indexed(&elements)
            }
            SubKind::ExpectingValuePropertyName { property_set } => {
                let elements = self.value_sample(ctx, self.index.limits().value_sample);
                self.properties_or_indexed(&elements, property_set)
            }
        }
    }

    /// First `cap` elements matching `filter`; empty when the filter is blank or fails.
    fn sample(&self, filter: &str, cap: usize) -> Vec<ElementId> {
        let filter = filter.trim();
        if filter.is_empty() {
            return Vec::new();
        }
        let mut elements = or_empty(self.evaluator.filter(self.model, filter), filter);
        elements.truncate(cap);
        elements
    }

    fn value_sample(&self, ctx: &CompletionContext, cap: usize) -> Vec<ElementId> {
        self.sample(ctx.preceding_filter_clause().unwrap_or_default(), cap)
    }

    fn attribute_or_keyword(&self, text: &str) -> BTreeSet<String> {
        let vocab = self.index.vocabulary();
        let mut candidates = self.index.types_in_model().clone();
        candidates.extend(vocab.filter_keywords.iter().cloned());
        candidates.extend(vocab.property_set_prefixes.iter().cloned());

        let filter = narrowing_filter(self.index, text);
        let elements = self.sample(&filter, self.index.limits().filter_sample);
        candidates.extend(self.observed_attributes(&elements));
        candidates.extend(self.observed_set_names(&elements));
        candidates
    }

    fn observed_attributes(&self, elements: &[ElementId]) -> BTreeSet<String> {
        let vocab = self.index.vocabulary();
        let mut names = BTreeSet::new();
        let mut seen_types = BTreeSet::new();
        for &element in elements {
            if let Ok(type_name) = self.model.type_name(element) {
                if seen_types.insert(type_name.clone()) {
                    names.extend(self.index.attributes_for_type(&type_name).iter().cloned());
                }
            }
            let attributes = or_empty(self.model.attribute_names(element), "attribute names");
            names.extend(
                attributes
                    .into_iter()
                    .filter(|name| vocab.is_attribute_name(name)),
            );
        }
        names
    }

    fn observed_set_names(&self, elements: &[ElementId]) -> BTreeSet<String> {
        elements
            .iter()
            .flat_map(|&e| or_empty(self.model.property_sets(e), "property sets").into_keys())
            .collect()
    }

    fn observed_properties(&self, elements: &[ElementId], set_name: &str) -> BTreeSet<String> {
        elements
            .iter()
            .filter_map(|&e| {
                or_empty(self.model.property_sets(e), "property sets").shift_remove(set_name)
            })
            .flat_map(|properties| properties.into_keys())
            .filter(|name| name != "id")
            .collect()
    }

    fn set_names_or_indexed(&self, elements: &[ElementId]) -> BTreeSet<String> {
        let names = self.observed_set_names(elements);
        if !names.is_empty() {
            return names;
        }
        self.index.property_set_names().cloned().collect()
    }

    fn properties_or_indexed(&self, elements: &[ElementId], set_name: &str) -> BTreeSet<String> {
        let names = self.observed_properties(elements, set_name);
        if !names.is_empty() {
            return names;
        }
        self.index
            .properties_of(set_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Quoted literals observed for `attribute`, or the boolean pair when
    /// the attribute holds booleans.
    fn attribute_values(&self, text: &str, attribute: &str) -> BTreeSet<String> {
        let vocab = self.index.vocabulary();
        let limits = self.index.limits();
        let filter = filter_before_comparison(self.index, text);
        let elements = self.sample(&filter, limits.filter_sample);
        let path = vocab.value_path_for(attribute);

        let mut values = BTreeSet::new();
        let mut saw_boolean = false;
        for &element in &elements {
            let value = match self.evaluator.get_value(self.model, element, path) {
                Ok(value) => value,
                Err(e) => {
                    debug!("value lookup {} on {} failed: {}", path, element, e);
                    continue;
                }
            };
            match value {
                Value::Bool(_) => saw_boolean = true,
                Value::Null | Value::List(_) | Value::Record(_) => {}
                other => {
                    let text = other.to_string();
                    let text = text.trim();
                    if !text.is_empty() && text.chars().count() <= limits.max_value_length {
                        values.extend(quote(text));
                    }
                }
            }
        }

        if saw_boolean {
            return [TRUE_LITERAL, FALSE_LITERAL]
                .into_iter()
                .map(String::from)
                .collect();
        }
        if !values.is_empty() {
            return values;
        }

        let indexed = self
            .index
            .names_for_keyword(attribute)
            .or_else(|| self.index.sample_values(attribute));
        indexed
            .into_iter()
            .flatten()
            .filter_map(|v| quote(v))
            .collect()
    }

    fn value_path(&self, ctx: &CompletionContext) -> BTreeSet<String> {
        let path = ctx.current_value_path().unwrap_or_default();
        match path.rsplit_once('.') {
            Some((partial_path, _)) => {
                let elements = self.value_sample(ctx, self.index.limits().path_sample);
                path::resolve(self.model, self.evaluator, self.index, &elements, partial_path)
            }
            None => self.value_root(ctx),
        }
    }

    /// First segment of a value path: keywords plus what the sampled
    /// elements actually carry.
    fn value_root(&self, ctx: &CompletionContext) -> BTreeSet<String> {
        let vocab = self.index.vocabulary();
        let mut candidates: BTreeSet<String> = vocab.value_keywords.clone();
        candidates.extend(vocab.common_attributes.iter().cloned());

        let elements = self.value_sample(ctx, self.index.limits().value_sample);
        candidates.extend(self.observed_attributes(&elements));
        candidates.extend(self.observed_set_names(&elements));
        candidates
    }
}
