use crate::shell::{view, ShellContext};
use modelpeek_core::PeekConfig;
use std::path::PathBuf;
use tabled::Table;

pub fn run(model: PathBuf, config: &PeekConfig) -> Result<(), Box<dyn std::error::Error>> {
    let context = ShellContext::open(model, config)?;
    let stats = context.stats();

    println!("Model: {}", context.model_path().display());
    println!("{}", Table::new(view::stat_rows(&stats)));
    if stats.degraded {
        println!("Warning: the model could not be scanned; completion is limited to keywords.");
    }
    Ok(())
}
