//! Stateless classification of a cursor position inside a partial query line.
//!
//! The context is re-derived from scratch on every request. Rules are plain
//! suffix predicates checked in a fixed order; the first match wins, so the
//! order below is behavior and must not be shuffled.

use crate::vocabulary::Vocabulary;
use once_cell::sync::Lazy;
use regex::Regex;

/// Separates the filter clause from value-extraction clauses.
pub const CLAUSE_SEPARATOR: char = ';';

static TRAILING_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_]\w*(?:\.\w+)?)\s*(!\*=|>=|<=|!=|\*=|>|<|=)\s*("[^"]*|[^\s",+]*)$"#)
        .expect("valid regex")
});
static TRAILING_SET_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_]\w*)\.(\w*)$").expect("valid regex"));
static TRAILING_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\s](\w+)$").expect("valid regex"));
static TRAILING_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,\s]([A-Za-z_]\w*(?:\.\w+)?)(\s*)(!?\*?)$").expect("valid regex")
});
static TYPE_THEN_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]\w*\s*,").expect("valid regex"));
static TYPE_THEN_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]\w*\s+$").expect("valid regex"));
static TRAILING_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,+]\s*$").expect("valid regex"));
static WORD_AFTER_PLUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+\s*!?[A-Za-z_]\w*$").expect("valid regex"));
static LONE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*!?[A-Za-z_]\w*$").expect("valid regex"));
static NEGATED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\s*([A-Za-z_]\w*)?$").expect("valid regex"));
static FILTER_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^,+\s]*$").expect("valid regex"));
static VALUE_SET_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)\.(\w*)$").expect("valid regex"));
static VALUE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.\s]*$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Filter,
    Value {
        /// Trimmed text before the first clause separator.
        preceding_filter_clause: String,
        /// Trimmed text of the current value segment up to the cursor.
        current_value_path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubKind {
    ExpectingClass,
    ExpectingAttributeOrKeyword,
    ExpectingPropertySetName,
    ExpectingPropertyName { property_set: String },
    ExpectingComparisonOperator { attribute: String },
    ExpectingAttributeValue { attribute: String },
    ExpectingValuePathSegment,
    ExpectingValuePropertySetName,
    ExpectingValuePropertyName { property_set: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    pub clause: Clause,
    pub subkind: SubKind,
    pub text_before_cursor: String,
    /// Partial word the candidates replace.
    pub current_word: String,
    /// Negative length of `current_word` in characters, or 0.
    pub replace_offset: isize,
}

impl CompletionContext {
    pub fn is_value_clause(&self) -> bool {
        matches!(self.clause, Clause::Value { .. })
    }

    pub fn preceding_filter_clause(&self) -> Option<&str> {
        match &self.clause {
            Clause::Value {
                preceding_filter_clause,
                ..
            } => Some(preceding_filter_clause),
            Clause::Filter => None,
        }
    }

    pub fn current_value_path(&self) -> Option<&str> {
        match &self.clause {
            Clause::Value {
                current_value_path, ..
            } => Some(current_value_path),
            Clause::Filter => None,
        }
    }
}

fn replace_offset(word: &str) -> isize {
    -(word.chars().count() as isize)
}

/// Byte offset of the `cursor`-th character, clamped to the end of `text`.
pub fn byte_offset(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Classifies the cursor position. `cursor` counts characters, not bytes.
pub fn classify(vocab: &Vocabulary, text: &str, cursor: usize) -> CompletionContext {
    let cursor_byte = byte_offset(text, cursor);
    let text_before_cursor = &text[..cursor_byte];

    match text.find(CLAUSE_SEPARATOR) {
        Some(separator) if cursor_byte > separator => {
            let preceding_filter_clause = text[..separator].trim().to_string();
            let remaining = &text[separator + CLAUSE_SEPARATOR.len_utf8()..];
            let remaining_cursor = cursor_byte - separator - CLAUSE_SEPARATOR.len_utf8();
            let segment = value_segment_before(remaining, remaining_cursor);
            classify_value(vocab, text_before_cursor, preceding_filter_clause, segment)
        }
        _ => classify_filter(vocab, text_before_cursor),
    }
}

/// Text of the value segment containing `cursor`, up to the cursor.
fn value_segment_before(remaining: &str, cursor: usize) -> &str {
    let mut start = 0;
    for segment in remaining.split(CLAUSE_SEPARATOR) {
        let end = start + segment.len();
        if cursor <= end {
            return &segment[..cursor - start];
        }
        start = end + CLAUSE_SEPARATOR.len_utf8();
    }
    ""
}

fn classify_filter(vocab: &Vocabulary, text: &str) -> CompletionContext {
    let context = |subkind: SubKind, word: &str| CompletionContext {
        clause: Clause::Filter,
        subkind,
        text_before_cursor: text.to_string(),
        current_word: word.to_string(),
        replace_offset: replace_offset(word),
    };

    // (i) attribute followed by an operator: a literal value comes next
    if let Some(caps) = TRAILING_COMPARISON.captures(text) {
        let partial = caps.get(3).map_or("", |m| m.as_str());
        return context(
            SubKind::ExpectingAttributeValue {
                attribute: caps[1].to_string(),
            },
            partial,
        );
    }

    // (ii) `Pset_WallCommon.` with an optional partial property name
    if let Some(caps) = TRAILING_SET_DOT.captures(text) {
        if vocab.is_property_set_name(&caps[1]) {
            let partial = caps.get(2).map_or("", |m| m.as_str());
            return context(
                SubKind::ExpectingPropertyName {
                    property_set: caps[1].to_string(),
                },
                partial,
            );
        }
    }

    // (iii) property-set prefix after a separator, except where a union expects a class
    if let Some(caps) = TRAILING_TOKEN.captures(text) {
        let token = caps.get(1).map_or("", |m| m.as_str());
        let before = text[..caps.get(0).map_or(0, |m| m.start())].trim_end();
        if vocab.is_property_set_prefix(token) && !before.ends_with('+') {
            return context(SubKind::ExpectingPropertySetName, token);
        }
    }

    // (iv) known keyword or attribute not yet followed by an operator
    if let Some(caps) = TRAILING_KEYWORD.captures(text) {
        let token = &caps[1];
        let spaced = !caps[2].is_empty();
        let is_property_ref = token
            .split_once('.')
            .is_some_and(|(set, _)| spaced && vocab.is_property_set_name(set));
        if vocab.is_comparable_keyword(token) || is_property_ref {
            let partial_operator = caps.get(3).map_or("", |m| m.as_str());
            return context(
                SubKind::ExpectingComparisonOperator {
                    attribute: token.to_string(),
                },
                partial_operator,
            );
        }
    }

    let word = filter_word(text);

    // (v) a type-like token already closed by a comma or whitespace in the current union branch
    let branch = text.rsplit('+').next().unwrap_or(text);
    if TYPE_THEN_COMMA.is_match(branch) || TYPE_THEN_SPACE.is_match(branch) {
        return context(SubKind::ExpectingAttributeOrKeyword, word);
    }

    // (vi) start of the query or right after a separator
    if text.trim().is_empty()
        || TRAILING_SEPARATOR.is_match(text)
        || WORD_AFTER_PLUS.is_match(text)
        || LONE_WORD.is_match(text)
    {
        return context(SubKind::ExpectingClass, word);
    }

    // (vii) fallback
    context(SubKind::ExpectingAttributeOrKeyword, word)
}

/// Partial word for class, attribute and keyword positions.
fn filter_word(text: &str) -> &str {
    if let Some(caps) = NEGATED_WORD.captures(text) {
        return caps.get(1).map_or("", |m| m.as_str());
    }
    FILTER_WORD.find(text).map_or("", |m| m.as_str())
}

fn classify_value(
    vocab: &Vocabulary,
    text_before_cursor: &str,
    preceding_filter_clause: String,
    segment: &str,
) -> CompletionContext {
    let current_value_path = segment.trim().to_string();
    // Whitespace before the cursor means a fresh word, whatever the path says.
    let fresh_word = segment.ends_with(char::is_whitespace);

    let (subkind, word) = match VALUE_SET_DOT.captures(&current_value_path) {
        Some(caps) if vocab.is_property_set_name(&caps[1]) => (
            SubKind::ExpectingValuePropertyName {
                property_set: caps[1].to_string(),
            },
            caps.get(2).map_or("", |m| m.as_str()),
        ),
        _ if !current_value_path.contains('.')
            && vocab.is_property_set_prefix(&current_value_path) =>
        {
            (
                SubKind::ExpectingValuePropertySetName,
                current_value_path.as_str(),
            )
        }
        _ => (
            SubKind::ExpectingValuePathSegment,
            VALUE_WORD
                .find(&current_value_path)
                .map_or("", |m| m.as_str()),
        ),
    };
    let word = if fresh_word { String::new() } else { word.to_string() };

    CompletionContext {
        clause: Clause::Value {
            preceding_filter_clause,
            current_value_path,
        },
        subkind,
        text_before_cursor: text_before_cursor.to_string(),
        replace_offset: replace_offset(&word),
        current_word: word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_end(text: &str) -> CompletionContext {
        classify(&Vocabulary::default(), text, text.chars().count())
    }

    #[test]
    fn test_empty_input_expects_class() {
        let ctx = at_end("");
        assert_eq!(ctx.clause, Clause::Filter);
        assert_eq!(ctx.subkind, SubKind::ExpectingClass);
        assert_eq!(ctx.replace_offset, 0);
    }

    #[test]
    fn test_partial_class_name() {
        let ctx = at_end("Wall");
        assert_eq!(ctx.subkind, SubKind::ExpectingClass);
        assert_eq!(ctx.current_word, "Wall");
        assert_eq!(ctx.replace_offset, -4);
    }

    #[test]
    fn test_after_class_and_comma() {
        let ctx = at_end("Wall, ");
        assert_eq!(ctx.subkind, SubKind::ExpectingAttributeOrKeyword);
        assert_eq!(ctx.current_word, "");

        let ctx = at_end("Wall, Na");
        assert_eq!(ctx.subkind, SubKind::ExpectingAttributeOrKeyword);
        assert_eq!(ctx.current_word, "Na");
        assert_eq!(ctx.replace_offset, -2);
    }

    #[test]
    fn test_union_branch_expects_class() {
        let ctx = at_end("Wall + Do");
        assert_eq!(ctx.subkind, SubKind::ExpectingClass);
        assert_eq!(ctx.current_word, "Do");

        // A set prefix right after `+` is still a class position.
        assert_eq!(at_end("Wall + P").subkind, SubKind::ExpectingClass);
        assert_eq!(at_end("Wall, Window + ").subkind, SubKind::ExpectingClass);
    }

    #[test]
    fn test_trailing_separator_without_type_expects_class() {
        assert_eq!(at_end(", ").subkind, SubKind::ExpectingClass);
        assert_eq!(at_end("Name=\"x\", ").subkind, SubKind::ExpectingClass);
    }

    #[test]
    fn test_attribute_value_after_operator() {
        let ctx = at_end("Wall, Name=");
        assert_eq!(
            ctx.subkind,
            SubKind::ExpectingAttributeValue {
                attribute: "Name".to_string()
            }
        );
        assert_eq!(ctx.replace_offset, 0);

        let ctx = at_end("Wall, Name=\"Ba");
        assert_eq!(ctx.current_word, "\"Ba");
        assert_eq!(ctx.replace_offset, -3);

        let ctx = at_end("Wall, Pset_WallCommon.LoadBearing != ");
        assert_eq!(
            ctx.subkind,
            SubKind::ExpectingAttributeValue {
                attribute: "Pset_WallCommon.LoadBearing".to_string()
            }
        );
    }

    #[test]
    fn test_property_names_after_set_dot() {
        let ctx = at_end("Wall, Pset_WallCommon.");
        assert_eq!(
            ctx.subkind,
            SubKind::ExpectingPropertyName {
                property_set: "Pset_WallCommon".to_string()
            }
        );
        assert_eq!(ctx.current_word, "");

        let ctx = at_end("Wall, Pset_WallCommon.Fi");
        assert_eq!(ctx.current_word, "Fi");
        assert_eq!(ctx.replace_offset, -2);
    }

    #[test]
    fn test_property_set_prefix() {
        let ctx = at_end("Wall, Ps");
        assert_eq!(ctx.subkind, SubKind::ExpectingPropertySetName);
        assert_eq!(ctx.current_word, "Ps");
    }

    #[test]
    fn test_operator_after_keyword() {
        let ctx = at_end("Wall, Name");
        assert_eq!(
            ctx.subkind,
            SubKind::ExpectingComparisonOperator {
                attribute: "Name".to_string()
            }
        );
        assert_eq!(ctx.replace_offset, 0);

        let ctx = at_end("Wall, material !");
        assert_eq!(ctx.current_word, "!");
        assert_eq!(ctx.replace_offset, -1);

        let ctx = at_end("Wall, Pset_WallCommon.FireRating ");
        assert!(matches!(
            ctx.subkind,
            SubKind::ExpectingComparisonOperator { .. }
        ));
    }

    #[test]
    fn test_rule_order_comparison_before_set_dot() {
        // Both (i) and (ii) match; the operator rule wins.
        let ctx = at_end("Wall, Name=Pset_X.");
        assert!(matches!(ctx.subkind, SubKind::ExpectingAttributeValue { .. }));
    }

    #[test]
    fn test_rule_order_keyword_before_type_with_space() {
        // "Name " is also a type-like token followed by whitespace.
        let ctx = at_end("Wall, Name ");
        assert!(matches!(
            ctx.subkind,
            SubKind::ExpectingComparisonOperator { .. }
        ));
    }

    #[test]
    fn test_rule_order_type_comma_before_trailing_separator() {
        assert_eq!(
            at_end("Wall, Name=\"x\", ").subkind,
            SubKind::ExpectingAttributeOrKeyword
        );
    }

    #[test]
    fn test_value_clause_root() {
        let ctx = at_end("Wall ; ");
        assert_eq!(
            ctx.clause,
            Clause::Value {
                preceding_filter_clause: "Wall".to_string(),
                current_value_path: String::new(),
            }
        );
        assert_eq!(ctx.subkind, SubKind::ExpectingValuePathSegment);
        assert_eq!(ctx.preceding_filter_clause(), Some("Wall"));
    }

    #[test]
    fn test_value_clause_dotted_path() {
        let ctx = at_end("Wall ; type.");
        assert_eq!(ctx.current_value_path(), Some("type."));
        assert_eq!(ctx.subkind, SubKind::ExpectingValuePathSegment);
        assert_eq!(ctx.current_word, "");

        let ctx = at_end("Wall ; type.Na");
        assert_eq!(ctx.current_word, "Na");
        assert_eq!(ctx.replace_offset, -2);
    }

    #[test]
    fn test_value_clause_property_sets() {
        let ctx = at_end("Wall ; Pset_WallCommon.");
        assert_eq!(
            ctx.subkind,
            SubKind::ExpectingValuePropertyName {
                property_set: "Pset_WallCommon".to_string()
            }
        );

        let ctx = at_end("Wall ; Ps");
        assert_eq!(ctx.subkind, SubKind::ExpectingValuePropertySetName);
        assert_eq!(ctx.current_word, "Ps");
    }

    #[test]
    fn test_value_clause_trailing_whitespace_starts_fresh_word() {
        let ctx = at_end("Wall ; Name ");
        assert_eq!(ctx.current_value_path(), Some("Name"));
        assert_eq!(ctx.current_word, "");
        assert_eq!(ctx.replace_offset, 0);
    }

    #[test]
    fn test_cursor_selects_value_segment() {
        let vocab = Vocabulary::default();
        let text = "Wall ; Na ; type";
        let ctx = classify(&vocab, text, 9);
        assert_eq!(ctx.current_value_path(), Some("Na"));

        let ctx = classify(&vocab, text, text.len());
        assert_eq!(ctx.current_value_path(), Some("type"));
        assert_eq!(ctx.preceding_filter_clause(), Some("Wall"));
    }

    #[test]
    fn test_cursor_before_separator_uses_prefix_only() {
        let vocab = Vocabulary::default();
        let ctx = classify(&vocab, "Wall, Name ; type", 4);
        assert_eq!(ctx.clause, Clause::Filter);
        assert_eq!(ctx.text_before_cursor, "Wall");
        assert_eq!(ctx.subkind, SubKind::ExpectingClass);

        // Exactly at the separator is still the filter clause.
        let ctx = classify(&vocab, "Wall;", 4);
        assert_eq!(ctx.clause, Clause::Filter);
    }

    #[test]
    fn test_cursor_counts_characters() {
        let ctx = at_end("Wänd");
        assert_eq!(ctx.current_word, "Wänd");
        assert_eq!(ctx.replace_offset, -4);

        let ctx = classify(&Vocabulary::default(), "Wall", 99);
        assert_eq!(ctx.text_before_cursor, "Wall");
    }

    #[test]
    fn test_negation_is_not_part_of_word() {
        let ctx = at_end("Wall, !");
        assert_eq!(ctx.current_word, "");
        let ctx = at_end("Wall, !Ext");
        assert_eq!(ctx.current_word, "Ext");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let vocab = Vocabulary::default();
        for text in ["", "Wall", "Wall, Pset_WallCommon.", "Wall ; type.", "A + B, Name="] {
            for cursor in 0..=text.chars().count() {
                assert_eq!(
                    classify(&vocab, text, cursor),
                    classify(&vocab, text, cursor)
                );
            }
        }
    }
}
