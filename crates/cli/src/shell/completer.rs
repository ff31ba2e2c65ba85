use super::command::COMMAND_PREFIX;
use super::context::ShellContext;
use modelpeek_core::completion::byte_offset;
use reedline::{Completer, Span, Suggestion};

pub struct PeekCompleter {
    pub commands: Vec<String>,
    pub context: ShellContext,
}

impl PeekCompleter {
    pub fn new(commands: Vec<String>, context: ShellContext) -> Self {
        Self { commands, context }
    }

    fn complete_command(&self, line: &str, pos: usize) -> Vec<Suggestion> {
        let typed = line[..pos].trim_start();
        let Some(partial) = typed.strip_prefix(COMMAND_PREFIX) else {
            return vec![];
        };
        if partial.contains(char::is_whitespace) {
            return vec![];
        }
        self.commands
            .iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| Suggestion {
                value: cmd.clone(),
                description: None,
                style: None,
                extra: None,
                span: Span {
                    start: pos - partial.len(),
                    end: pos,
                },
                append_whitespace: true,
                match_indices: None,
            })
            .collect()
    }
}

/// Byte span covering the `-replace_offset` characters before byte `pos`.
pub fn replacement_span(line: &str, pos: usize, replace_offset: isize) -> Span {
    let cursor = line[..pos].chars().count();
    let removed = replace_offset.unsigned_abs().min(cursor);
    Span {
        start: byte_offset(line, cursor - removed),
        end: pos,
    }
}

impl Completer for PeekCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        // reedline positions are byte offsets
        let pos = pos.min(line.len());
        if !line.is_char_boundary(pos) {
            return vec![];
        }
        if line.trim_start().starts_with(COMMAND_PREFIX) {
            return self.complete_command(line, pos);
        }

        let cursor = line[..pos].chars().count();
        let (_, candidates) = self.context.complete(line, cursor);

        candidates
            .into_iter()
            .map(|candidate| Suggestion {
                span: replacement_span(line, pos, candidate.replace_offset),
                value: candidate.text,
                description: None,
                style: None,
                extra: None,
                append_whitespace: false,
                match_indices: None,
            })
            .collect()
    }
}
