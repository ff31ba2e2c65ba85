//! Minimal filter and value-path evaluator for any [`Model`].
//!
//! Filter grammar: `+` separates groups whose results are unioned; `,`
//! separates facets inside a group. Type facets (`IfcWall`, `!IfcWallType`)
//! seed the group, every other facet narrows it:
//!
//! - `path OP literal` with `OP` one of `= != > >= < <= *= !*=`
//! - `path` alone, where `path` contains a dot: the value must exist
//!
//! Filter keywords (`material`, `type`, ...) are compared through their
//! value path, so `material="Concrete"` reads `material.Name`.

use crate::vocabulary::{Vocabulary, FALSE_LITERAL, TRUE_LITERAL};
use modelpeek_api::{ApiError, ApiResult, ElementId, ElementRef, Model, SelectorEvaluator, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static TYPE_FACET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(!?)\s*([A-Z]\w*)$").expect("valid regex"));
static COMPARISON_FACET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][\w.]*)\s*(!\*=|>=|<=|!=|\*=|>|<|=)\s*(.*)$").expect("valid regex")
});
static EXISTENCE_FACET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*(?:\.\w+)+$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    NotContains,
}

impl Operator {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "=" => Self::Eq,
            "!=" => Self::Ne,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "<" => Self::Lt,
            "<=" => Self::Le,
            "*=" => Self::Contains,
            "!*=" => Self::NotContains,
            _ => return None,
        })
    }

    fn is_negative(self) -> bool {
        matches!(self, Self::Ne | Self::NotContains)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Facet {
    Type { name: String, negated: bool },
    Compare { path: String, op: Operator, literal: Value },
    Exists { path: String },
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceSelector {
    vocabulary: Vocabulary,
}

impl ReferenceSelector {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    fn parse_facet(&self, text: &str) -> ApiResult<Facet> {
        if let Some(caps) = TYPE_FACET.captures(text) {
            return Ok(Facet::Type {
                name: caps[2].to_string(),
                negated: !caps[1].is_empty(),
            });
        }
        if let Some(caps) = COMPARISON_FACET.captures(text) {
            let op = Operator::parse(&caps[2])
                .ok_or_else(|| ApiError::evaluation(format!("unknown operator {}", &caps[2])))?;
            return Ok(Facet::Compare {
                path: self.vocabulary.value_path_for(&caps[1]).to_string(),
                op,
                literal: parse_literal(caps[3].trim())?,
            });
        }
        if EXISTENCE_FACET.is_match(text) {
            return Ok(Facet::Exists {
                path: text.to_string(),
            });
        }
        Err(ApiError::evaluation(format!("cannot parse filter `{}`", text)))
    }

    fn evaluate_group(&self, model: &dyn Model, group: &str) -> ApiResult<BTreeSet<ElementId>> {
        let facets = split_outside_quotes(group, ',')?
            .into_iter()
            .map(|facet| {
                let facet = facet.trim();
                if facet.is_empty() {
                    return Err(ApiError::evaluation(format!("empty facet in `{}`", group)));
                }
                self.parse_facet(facet)
            })
            .collect::<ApiResult<Vec<_>>>()?;

        let mut seed: Option<BTreeSet<ElementId>> = None;
        let mut excluded = BTreeSet::new();
        for facet in &facets {
            if let Facet::Type { name, negated } = facet {
                let members = model.elements_of_type(name)?;
                if *negated {
                    excluded.extend(members);
                } else {
                    seed.get_or_insert_with(BTreeSet::new).extend(members);
                }
            }
        }
        let seed = match seed {
            Some(seed) => seed,
            None => model.iterate_elements()?.into_iter().collect(),
        };

        let mut selected = BTreeSet::new();
        for element in seed.difference(&excluded) {
            if self.matches_all(model, *element, &facets)? {
                selected.insert(*element);
            }
        }
        Ok(selected)
    }

    fn matches_all(&self, model: &dyn Model, element: ElementId, facets: &[Facet]) -> ApiResult<bool> {
        for facet in facets {
            let keep = match facet {
                Facet::Type { .. } => true,
                Facet::Compare { path, op, literal } => {
                    compare(&self.get_value(model, element, path)?, *op, literal)
                }
                Facet::Exists { path } => !self.get_value(model, element, path)?.is_null(),
            };
            if !keep {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn step(&self, model: &dyn Model, current: Value, segment: &str) -> ApiResult<Value> {
        match current {
            Value::Null => Ok(Value::Null),
            Value::Element(reference) => {
                let element = reference.id;
                match segment {
                    "id" => Ok(Value::Int(element.0 as i64)),
                    "class" => Ok(Value::Text(model.type_name(element)?)),
                    _ => {
                        if let Some(value) = model.get_attribute(element, segment)? {
                            return Ok(value);
                        }
                        Ok(model
                            .property_sets(element)?
                            .shift_remove(segment)
                            .map(Value::Record)
                            .unwrap_or(Value::Null))
                    }
                }
            }
            Value::Record(mut fields) => Ok(fields.shift_remove(segment).unwrap_or(Value::Null)),
            Value::List(items) => {
                if segment == "count" {
                    return Ok(Value::Int(items.len() as i64));
                }
                let index: usize = segment.parse().map_err(|_| {
                    ApiError::evaluation(format!("`{}` is not valid on a list", segment))
                })?;
                Ok(items.into_iter().nth(index).unwrap_or(Value::Null))
            }
            scalar => Err(ApiError::evaluation(format!(
                "cannot read `{}` from scalar {}",
                segment, scalar
            ))),
        }
    }
}

impl SelectorEvaluator for ReferenceSelector {
    fn filter(&self, model: &dyn Model, filter_clause: &str) -> ApiResult<Vec<ElementId>> {
        let clause = filter_clause.trim();
        if clause.is_empty() {
            return Err(ApiError::evaluation("empty filter"));
        }
        let mut selected = BTreeSet::new();
        for group in split_outside_quotes(clause, '+')? {
            let group = group.trim();
            if group.is_empty() {
                return Err(ApiError::evaluation(format!("empty group in `{}`", clause)));
            }
            selected.extend(self.evaluate_group(model, group)?);
        }
        Ok(selected.into_iter().collect())
    }

    fn get_value(&self, model: &dyn Model, element: ElementId, path: &str) -> ApiResult<Value> {
        let path = path.trim();
        if path.is_empty() {
            return Err(ApiError::evaluation("empty value path"));
        }
        let mut current = Value::Element(ElementRef { id: element });
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(ApiError::evaluation(format!("empty segment in `{}`", path)));
            }
            current = self.step(model, current, segment)?;
        }
        Ok(current)
    }
}

/// Splits on `separator` where it is not inside a double-quoted literal.
fn split_outside_quotes(text: &str, separator: char) -> ApiResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in text.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    if quoted {
        return Err(ApiError::evaluation(format!("unterminated literal in `{}`", text)));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

fn parse_literal(text: &str) -> ApiResult<Value> {
    if let Some(rest) = text.strip_prefix('"') {
        return rest
            .strip_suffix('"')
            .filter(|inner| !inner.contains('"'))
            .map(Value::from)
            .ok_or_else(|| ApiError::evaluation(format!("malformed literal {}", text)));
    }
    match text {
        "" => Err(ApiError::evaluation("missing literal")),
        TRUE_LITERAL => Ok(Value::Bool(true)),
        FALSE_LITERAL => Ok(Value::Bool(false)),
        bare if bare.contains(char::is_whitespace) => Err(ApiError::evaluation(format!(
            "unquoted literal with spaces: {}",
            bare
        ))),
        bare => Ok(Value::from(bare)),
    }
}

fn compare(actual: &Value, op: Operator, literal: &Value) -> bool {
    match actual {
        // A list matches when any member does; negative operators need all members to.
        Value::List(items) if op.is_negative() => items.iter().all(|v| compare(v, op, literal)),
        Value::List(items) => items.iter().any(|v| compare(v, op, literal)),
        Value::Null => op.is_negative(),
        _ => compare_scalar(actual, op, literal),
    }
}

fn compare_scalar(actual: &Value, op: Operator, literal: &Value) -> bool {
    if let (Value::Bool(a), Value::Bool(b)) = (actual, literal) {
        return match op {
            Operator::Eq => a == b,
            Operator::Ne => a != b,
            _ => false,
        };
    }
    let numeric = actual.as_f64().zip(literal.as_f64());
    let actual_text = actual.to_string();
    let literal_text = literal.to_string();
    match op {
        Operator::Eq => match numeric {
            Some((a, b)) => a == b,
            None => actual_text == literal_text,
        },
        Operator::Ne => !compare_scalar(actual, Operator::Eq, literal),
        Operator::Contains => actual_text.contains(&literal_text),
        Operator::NotContains => !actual_text.contains(&literal_text),
        Operator::Gt => numeric.is_some_and(|(a, b)| a > b),
        Operator::Ge => numeric.is_some_and(|(a, b)| a >= b),
        Operator::Lt => numeric.is_some_and(|(a, b)| a < b),
        Operator::Le => numeric.is_some_and(|(a, b)| a <= b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ElementRecord, MemoryModel};

    fn model() -> MemoryModel {
        MemoryModel::new()
            .with_supertype("IfcWall", Some("IfcBuildingElement"))
            .with_supertype("IfcDoor", Some("IfcBuildingElement"))
            .with_supertype("IfcBuildingElement", None)
            .with_element(
                ElementRecord::new(1, "IfcWall")
                    .attribute("Name", "Basic Wall")
                    .attribute("Width", 200.0)
                    .attribute("material", Value::element(10))
                    .property("Pset_WallCommon", "IsExternal", true)
                    .property("Pset_WallCommon", "FireRating", "2HR"),
            )
            .with_element(
                ElementRecord::new(2, "IfcWall")
                    .attribute("Name", "Curtain Wall")
                    .attribute("Width", 50.0)
                    .property("Pset_WallCommon", "IsExternal", false),
            )
            .with_element(ElementRecord::new(3, "IfcDoor").attribute("Name", "D1"))
            .with_element(ElementRecord::new(10, "IfcMaterial").attribute("Name", "Concrete"))
            .with_element(
                ElementRecord::new(11, "IfcWallType")
                    .attribute("Layers", Value::List(vec![Value::element(10), Value::element(10)])),
            )
    }

    fn ids(result: ApiResult<Vec<ElementId>>) -> Vec<u64> {
        result.unwrap().into_iter().map(|e| e.0).collect()
    }

    #[test]
    fn test_type_facets_include_subtypes_and_union() {
        let selector = ReferenceSelector::default();
        let model = model();
        assert_eq!(ids(selector.filter(&model, "IfcWall")), vec![1, 2]);
        assert_eq!(ids(selector.filter(&model, "IfcBuildingElement")), vec![1, 2, 3]);
        assert_eq!(ids(selector.filter(&model, "IfcWall + IfcDoor")), vec![1, 2, 3]);
        assert_eq!(ids(selector.filter(&model, "IfcWall, IfcDoor")), vec![1, 2, 3]);
        assert_eq!(
            ids(selector.filter(&model, "IfcBuildingElement, !IfcDoor")),
            vec![1, 2]
        );
    }

    #[test]
    fn test_comparisons_narrow_the_group() {
        let selector = ReferenceSelector::default();
        let model = model();
        assert_eq!(ids(selector.filter(&model, "IfcWall, Name=\"Basic Wall\"")), vec![1]);
        assert_eq!(ids(selector.filter(&model, "IfcWall, Name*=Curtain")), vec![2]);
        assert_eq!(ids(selector.filter(&model, "IfcWall, Width>100")), vec![1]);
        assert_eq!(ids(selector.filter(&model, "IfcWall, Width<=50")), vec![2]);
        assert_eq!(
            ids(selector.filter(&model, "IfcWall, Pset_WallCommon.IsExternal=TRUE")),
            vec![1]
        );
        assert_eq!(
            ids(selector.filter(&model, "IfcWall, Pset_WallCommon.FireRating")),
            vec![1]
        );
    }

    #[test]
    fn test_keywords_compare_through_value_path() {
        let selector = ReferenceSelector::default();
        let model = model();
        assert_eq!(ids(selector.filter(&model, "IfcWall, material=Concrete")), vec![1]);
        assert_eq!(ids(selector.filter(&model, "IfcWall, material!=Concrete")), vec![2]);
    }

    #[test]
    fn test_malformed_filters_are_errors() {
        let selector = ReferenceSelector::default();
        let model = model();
        for bad in ["", "IfcWall,", "IfcWall, Name=\"open", "IfcWall +", "lowercase", "IfcWall, Name="] {
            assert!(
                matches!(selector.filter(&model, bad), Err(ApiError::Evaluation(_))),
                "{:?} should fail",
                bad
            );
        }
    }

    #[test]
    fn test_value_paths() {
        let selector = ReferenceSelector::default();
        let model = model();
        let wall = ElementId(1);
        assert_eq!(selector.get_value(&model, wall, "id").unwrap(), Value::Int(1));
        assert_eq!(
            selector.get_value(&model, wall, "class").unwrap(),
            Value::from("IfcWall")
        );
        assert_eq!(
            selector.get_value(&model, wall, "material.Name").unwrap(),
            Value::from("Concrete")
        );
        assert_eq!(
            selector.get_value(&model, wall, "Pset_WallCommon.FireRating").unwrap(),
            Value::from("2HR")
        );
        assert!(selector.get_value(&model, wall, "Missing.Name").unwrap().is_null());

        let wall_type = ElementId(11);
        assert_eq!(
            selector.get_value(&model, wall_type, "Layers.count").unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            selector.get_value(&model, wall_type, "Layers.0.Name").unwrap(),
            Value::from("Concrete")
        );
        assert!(selector.get_value(&model, wall_type, "Layers.x").is_err());
        assert!(selector.get_value(&model, wall, "Name.x").is_err());
        assert!(selector.get_value(&model, wall, "type..Name").is_err());
    }
}
