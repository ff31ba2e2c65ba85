use nu_ansi_term::Color;
use reedline::{Prompt, PromptEditMode, PromptHistorySearch};
use std::borrow::Cow;

/// Longest model name shown before it is elided
const MAX_NAME_LEN: usize = 30;

pub struct PeekPrompt {
    model_name: String,
}

impl PeekPrompt {
    pub fn new(model_name: String) -> Self {
        Self { model_name }
    }
}

impl Prompt for PeekPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let prefix = Color::LightBlue.bold().paint("modelpeek");
        let name = Color::Yellow.paint(shorten_name(&self.model_name));
        Cow::Owned(format!("{} {} > ", prefix, name))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(".. ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("(search) ")
    }
}

fn shorten_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_LEN {
        return name.to_string();
    }
    let tail: String = name
        .chars()
        .rev()
        .take(MAX_NAME_LEN - 1)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("…{}", tail)
}
