use modelpeek_core::{Candidate, Clause, CompletionContext, IndexStats, QueryResult, SubKind};
use nu_ansi_term::Color;
use tabled::Tabled;

/// One completion candidate as a table row
#[derive(Tabled)]
pub struct CandidateView {
    #[tabled(rename = "Candidate")]
    pub text: String,
    #[tabled(rename = "Replace")]
    pub replace: isize,
}

impl From<&Candidate> for CandidateView {
    fn from(candidate: &Candidate) -> Self {
        Self {
            text: candidate.text.clone(),
            replace: candidate.replace_offset,
        }
    }
}

#[derive(Tabled)]
pub struct StatRow {
    #[tabled(rename = "Table")]
    pub name: &'static str,
    #[tabled(rename = "Entries")]
    pub entries: usize,
}

pub fn stat_rows(stats: &IndexStats) -> Vec<StatRow> {
    [
        ("Types (with ancestors)", stats.types),
        ("Property sets", stats.property_sets),
        ("Typed attribute sets", stats.typed_attribute_sets),
        ("Sampled attributes", stats.sampled_attributes),
        ("Material names", stats.materials),
        ("Spatial names", stats.spatial_names),
        ("Type object names", stats.type_objects),
    ]
    .into_iter()
    .map(|(name, entries)| StatRow { name, entries })
    .collect()
}

fn subkind_label(subkind: &SubKind) -> String {
    match subkind {
        SubKind::ExpectingClass => "class".to_string(),
        SubKind::ExpectingAttributeOrKeyword => "attribute or keyword".to_string(),
        SubKind::ExpectingPropertySetName => "property set".to_string(),
        SubKind::ExpectingPropertyName { property_set } => {
            format!("property of {}", property_set)
        }
        SubKind::ExpectingComparisonOperator { attribute } => {
            format!("operator after {}", attribute)
        }
        SubKind::ExpectingAttributeValue { attribute } => format!("value of {}", attribute),
        SubKind::ExpectingValuePathSegment => "value path segment".to_string(),
        SubKind::ExpectingValuePropertySetName => "property set (value)".to_string(),
        SubKind::ExpectingValuePropertyName { property_set } => {
            format!("property of {} (value)", property_set)
        }
    }
}

pub fn describe_context(ctx: &CompletionContext) -> String {
    let clause = match &ctx.clause {
        Clause::Filter => "filter".to_string(),
        Clause::Value {
            preceding_filter_clause,
            current_value_path,
        } => format!(
            "value (filter `{}`, path `{}`)",
            preceding_filter_clause, current_value_path
        ),
    };
    format!(
        "Clause:   {}\nExpects:  {}\nWord:     {:?} (replace {})",
        clause,
        subkind_label(&ctx.subkind),
        ctx.current_word,
        ctx.replace_offset
    )
}

/// Output lines for a query: `#id=Type` per element, or the tab-separated
/// value cells when the query has value paths.
pub fn result_lines(result: &QueryResult, color: bool) -> Vec<String> {
    result
        .rows
        .iter()
        .map(|row| {
            if result.has_values() {
                row.values.join("\t")
            } else if color {
                format!(
                    "{}{}{}",
                    Color::LightBlue.paint(row.element.to_string()),
                    Color::DarkGray.paint("="),
                    Color::LightGreen.paint(&row.type_name)
                )
            } else {
                format!("{}={}", row.element, row.type_name)
            }
        })
        .collect()
}
