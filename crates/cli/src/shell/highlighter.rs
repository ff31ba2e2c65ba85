use super::command::COMMAND_PREFIX;
use modelpeek_core::Vocabulary;
use nu_ansi_term::{Color, Style};
use once_cell::sync::Lazy;
use reedline::{Highlighter, StyledText};
use regex::Regex;

// Every character belongs to exactly one token, so the pieces concatenate back to the line.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"[^"]*"?|!\*=|>=|<=|!=|\*=|[=<>]|[;,+!]|[A-Za-z_][\w.]*|\s+|."#).expect("valid regex")
});

pub struct PeekHighlighter {
    commands: Vec<String>,
    vocabulary: Vocabulary,
}

impl PeekHighlighter {
    pub fn new(commands: Vec<String>, vocabulary: Vocabulary) -> Self {
        Self {
            commands,
            vocabulary,
        }
    }

    fn word_style(&self, word: &str, in_filter: bool) -> Style {
        let head = word.split('.').next().unwrap_or(word);
        if word.contains('.') && self.vocabulary.is_property_set_name(head) {
            Style::new().fg(Color::Magenta)
        } else if in_filter && self.vocabulary.filter_keywords.contains(word) {
            Style::new().fg(Color::LightBlue)
        } else if !in_filter && self.vocabulary.value_keywords.contains(head) {
            Style::new().fg(Color::LightBlue)
        } else if in_filter && self.vocabulary.is_type_like(word) {
            Style::new().fg(Color::LightGreen)
        } else {
            Style::new()
        }
    }
}

impl Highlighter for PeekHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();

        if let Some(rest) = line.trim_start().strip_prefix(COMMAND_PREFIX) {
            let name = rest.split_whitespace().next().unwrap_or("");
            let style = if self.commands.iter().any(|c| c == name) {
                Style::new().fg(Color::LightGreen).bold()
            } else {
                Style::new().fg(Color::Red)
            };
            styled_text.push((style, line.to_string()));
            return styled_text;
        }

        let mut in_filter = true;
        for token in TOKEN.find_iter(line).map(|m| m.as_str()) {
            let style = match token {
                ";" => {
                    in_filter = false;
                    Style::new().fg(Color::DarkGray).bold()
                }
                "," | "+" => Style::new().fg(Color::DarkGray),
                "!" => Style::new().fg(Color::Red),
                t if t.starts_with('"') => Style::new().fg(Color::Yellow),
                "=" | "!=" | ">" | ">=" | "<" | "<=" | "*=" | "!*=" => {
                    Style::new().fg(Color::Cyan)
                }
                t if t.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') => {
                    self.word_style(t, in_filter)
                }
                _ => Style::new(),
            };
            styled_text.push((style, token.to_string()));
        }

        styled_text
    }
}
