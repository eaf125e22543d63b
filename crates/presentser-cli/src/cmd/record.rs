use crate::cmd::calc::{print_projection, stored_target, AttendanceArgs};
use crate::output::{opt_num, opt_str, print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use presentser_core::error::PresentserError;
use presentser_core::paths;
use presentser_core::projection::{self, TargetSpec};
use presentser_core::record::{RecordPatch, RecordStore, GUEST_KEY};
use std::path::Path;

// ---------------------------------------------------------------------------
// save
// ---------------------------------------------------------------------------

pub fn save(root: &Path, username: &str, args: &AttendanceArgs, json: bool) -> anyhow::Result<()> {
    let target = stored_target(args.target.as_deref())?;
    let patch = RecordPatch {
        present: Some(args.present),
        total: Some(args.total),
        target,
        gender: args.gender.clone(),
        ..Default::default()
    };

    let path = paths::records_path(root);
    let mut store = RecordStore::load(&path).context("failed to load records")?;
    let record = store.apply_save(username, patch, Utc::now()).clone();
    store.save(&path).context("failed to save records")?;

    if json {
        print_json(&serde_json::json!({ "ok": true, "username": username, "record": record }))?;
    } else {
        println!("Saved '{username}': {} / {}", record.present, record.total);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

pub fn status(root: &Path, username: Option<&str>, json: bool) -> anyhow::Result<()> {
    let username = username.unwrap_or(GUEST_KEY);
    let store = RecordStore::load(&paths::records_path(root)).context("failed to load records")?;
    let record = store
        .get(username)
        .ok_or_else(|| PresentserError::RecordNotFound(username.to_string()))?;

    if json {
        return print_json(record);
    }

    // The stored explicit target wins, then the stored gender default.
    let spec = TargetSpec {
        explicit: record.target.map(|t| t.to_string()),
        category: record.gender.clone(),
    };
    let target_pct = spec.resolve()?;
    let input = record.attendance();

    println!("User:       {username}");
    if let Some(name) = &record.first_name {
        println!("Name:       {name}");
    }
    if let Some(at) = record.updated_at {
        println!("Updated:    {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    let result = projection::project(input, target_pct, &mut rand::thread_rng());
    print_projection(input, &result, false)
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

pub fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = RecordStore::load(&paths::records_path(root)).context("failed to load records")?;
    let rows = store.rows();

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No records.");
        return Ok(());
    }

    let headers = &["USERNAME", "PRESENT", "TOTAL", "TARGET", "GENDER", "FIRST NAME"];
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.username.clone(),
                r.present.to_string(),
                r.total.to_string(),
                opt_num(r.target),
                opt_str(r.gender.as_deref()),
                opt_str(r.first_name.as_deref()),
            ]
        })
        .collect();
    print_table(headers, table);
    Ok(())
}
