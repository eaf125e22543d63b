use crate::output::print_json;
use anyhow::Context;
use presentser_core::paths;
use presentser_core::visits::VisitLog;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let log = VisitLog::load(&paths::visits_path(root)).context("failed to load visit log")?;
    let stats = log.stats();
    if json {
        return print_json(&stats);
    }
    println!("Unique visitors: {}", stats.unique_visitors);
    println!("Total hits:      {}", stats.total_hits);
    Ok(())
}
