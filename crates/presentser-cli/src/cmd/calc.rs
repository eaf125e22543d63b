use crate::output::print_json;
use clap::Args;
use presentser_core::error::PresentserError;
use presentser_core::projection::{self, AttendanceInput, ProjectionResult, TargetSpec};
use serde::Serialize;

#[derive(Args, Debug, Clone)]
pub struct AttendanceArgs {
    /// Classes attended so far
    #[arg(long, value_parser = parse_present)]
    pub present: f64,

    /// Classes held so far
    #[arg(long, value_parser = parse_total)]
    pub total: f64,

    /// Target percentage (overrides the gender default)
    #[arg(long)]
    pub target: Option<String>,

    /// Gender key used to pick a default target (male: 75, female: 73)
    #[arg(long)]
    pub gender: Option<String>,
}

fn finite_count(field: &str, raw: &str) -> Result<f64, PresentserError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| PresentserError::InvalidInput {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

fn parse_present(raw: &str) -> Result<f64, PresentserError> {
    finite_count("present", raw)
}

fn parse_total(raw: &str) -> Result<f64, PresentserError> {
    finite_count("total", raw)
}

impl AttendanceArgs {
    pub fn input(&self) -> AttendanceInput {
        AttendanceInput::new(self.present, self.total)
    }

    pub fn target_spec(&self) -> TargetSpec {
        TargetSpec {
            explicit: self.target.clone(),
            category: self.gender.clone(),
        }
    }
}

/// Explicit target to store with a record. Blank and zero mean "none".
pub fn stored_target(raw: Option<&str>) -> Result<Option<f64>, PresentserError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => match text.parse::<f64>() {
            Ok(t) if t == 0.0 => Ok(None),
            Ok(t) if t.is_finite() => Ok(Some(t)),
            _ => Err(PresentserError::InvalidTarget(text.to_string())),
        },
    }
}

#[derive(Serialize)]
struct CalcOutput<'a> {
    present: f64,
    total: f64,
    #[serde(flatten)]
    result: &'a ProjectionResult,
}

pub fn run(args: &AttendanceArgs, json: bool) -> anyhow::Result<()> {
    let input = args.input();
    let target_pct = args.target_spec().resolve()?;
    if input.total <= 0.0 {
        return Err(PresentserError::NoClassesHeld.into());
    }
    let result = projection::project(input, target_pct, &mut rand::thread_rng());
    print_projection(input, &result, json)
}

/// Print a projection as JSON or as a short human summary.
pub fn print_projection(
    input: AttendanceInput,
    result: &ProjectionResult,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(&CalcOutput {
            present: input.present,
            total: input.total,
            result,
        });
    }

    println!("Attendance: {} / {}", input.present, input.total);
    println!("Current:    {:.2}%", result.current_pct);
    println!("Target:     {:.2}%", result.target_pct);
    match result.required_future_days {
        Some(0) => println!("Required:   target already met"),
        Some(days) => println!("Required:   attend the next {days} classes"),
        None => println!("Required:   not reachable by attending alone"),
    }
    println!("Bunkable:   {} classes", result.bunkable_days);
    println!();
    println!("{}", result.quip);
    Ok(())
}
