use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use presentser_core::paths;
use presentser_core::record::{RecordPatch, RecordStore};
use presentser_core::recover::recover_from_log;
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// recover
// ---------------------------------------------------------------------------

pub fn recover(log: &Path, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    // Server logs may hold stray non-UTF-8 bytes; decode lossily.
    let bytes = std::fs::read(log).with_context(|| format!("failed to read {}", log.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let recovery = recover_from_log(&text);

    for failure in &recovery.failures {
        tracing::warn!(line = failure.line, reason = %failure.reason, "skipped log line");
    }

    match out {
        Some(path) => {
            let data = serde_json::to_string_pretty(&recovery.records)?;
            presentser_core::io::atomic_write(path, data.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            if json {
                print_json(&serde_json::json!({
                    "recovered": recovery.records.len(),
                    "failed": recovery.failures.len(),
                    "out": path.display().to_string(),
                }))?;
            } else {
                println!(
                    "Recovered {} records ({} lines skipped). Saved to {}",
                    recovery.records.len(),
                    recovery.failures.len(),
                    path.display()
                );
            }
        }
        None => print_json(&recovery.records)?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

pub fn merge(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let recovered: BTreeMap<String, RecordPatch> =
        serde_json::from_str(&data).context("recovered file is not a record map")?;

    let path = paths::records_path(root);
    let mut store = RecordStore::load(&path).context("failed to load records")?;
    let summary = store.merge(recovered, Utc::now());
    store.save(&path).context("failed to save records")?;

    if json {
        print_json(&summary)?;
    } else {
        println!(
            "Merge complete: {} inserted, {} updated",
            summary.inserted, summary.updated
        );
    }
    Ok(())
}
