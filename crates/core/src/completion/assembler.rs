use std::collections::BTreeSet;

/// One proposed completion: delete `-replace_offset` characters before the
/// cursor and insert `text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidate {
    pub text: String,
    pub replace_offset: isize,
}

fn unquote(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Keeps candidates that extend `current_word` (case-insensitively, quotes
/// ignored), sorted. `max_candidates` truncates only when set.
pub fn assemble(
    raw: BTreeSet<String>,
    current_word: &str,
    replace_offset: isize,
    max_candidates: Option<usize>,
) -> Vec<Candidate> {
    let partial = current_word.strip_prefix('"').unwrap_or(current_word).to_lowercase();

    raw.into_iter()
        .filter(|candidate| unquote(candidate).to_lowercase().starts_with(&partial))
        .take(max_candidates.unwrap_or(usize::MAX))
        .map(|text| Candidate {
            text,
            replace_offset,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn texts(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_prefix_filter_is_case_insensitive() {
        let out = assemble(raw(&["Wall", "Window", "Door", "wallpaper"]), "wa", -2, None);
        assert_eq!(texts(&out), vec!["Wall", "wallpaper"]);
        assert!(out.iter().all(|c| c.replace_offset == -2));
    }

    #[test]
    fn test_quoted_candidates_match_unquoted_prefix() {
        let out = assemble(raw(&["\"Basic Wall\"", "\"Curtain\""]), "Bas", -3, None);
        assert_eq!(texts(&out), vec!["\"Basic Wall\""]);

        let out = assemble(raw(&["\"Basic Wall\"", "\"Curtain\""]), "\"cu", -3, None);
        assert_eq!(texts(&out), vec!["\"Curtain\""]);
    }

    #[test]
    fn test_empty_word_keeps_everything_sorted() {
        let out = assemble(raw(&["b", "a", "C"]), "", 0, None);
        assert_eq!(texts(&out), vec!["C", "a", "b"]);
    }

    #[test]
    fn test_no_cap_returns_every_match() {
        let set: BTreeSet<String> = (0..300).map(|i| format!("Ifc{:03}", i)).collect();
        let out = assemble(set, "", 0, None);
        assert_eq!(out.len(), 300);
        assert_eq!(out.last().map(|c| c.text.as_str()), Some("Ifc299"));
    }

    #[test]
    fn test_explicit_cap_is_deterministic() {
        let set: BTreeSet<String> = (0..20).map(|i| format!("Attr{:02}", i)).collect();
        let first = assemble(set.clone(), "attr", -4, Some(5));
        let second = assemble(set, "attr", -4, Some(5));
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert_eq!(first[0].text, "Attr00");
    }
}
