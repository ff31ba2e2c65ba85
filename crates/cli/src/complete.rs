use crate::shell::{view, ShellContext};
use modelpeek_core::PeekConfig;
use std::path::PathBuf;
use tabled::{settings::Style, Table};

pub fn run(
    model: PathBuf,
    text: &str,
    cursor: Option<usize>,
    config: &PeekConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = ShellContext::open(model, config)?;
    let cursor = cursor.unwrap_or_else(|| text.chars().count());

    let (ctx, candidates) = context.complete(text, cursor);
    println!("{}", view::describe_context(&ctx));

    if candidates.is_empty() {
        println!("No candidates.");
        return Ok(());
    }
    let rows: Vec<_> = candidates.iter().map(view::CandidateView::from).collect();
    println!("{}", Table::new(rows).with(Style::psql()));
    Ok(())
}
