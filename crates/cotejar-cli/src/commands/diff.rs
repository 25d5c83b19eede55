//! Per-layer difference command.
//!
//! Reports the signed mean of (base - finetuned) for every learnable
//! layer shared by both models. Shape mismatches are reported per layer
//! and do not abort the pass.

use crate::error::Result;
use crate::source::load_model;
use colored::Colorize;
use cotejar::{layer_differences, DiffOutcome};
use serde::Serialize;

#[derive(Serialize)]
struct DiffEntry {
    name: String,
    shape_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean_diff: Option<f64>,
}

/// Run the diff command
pub(crate) fn run(base: &str, finetuned: &str, json: bool) -> Result<()> {
    let base_set = load_model(base, "base", json)?;
    let tuned_set = load_model(finetuned, "finetuned", json)?;

    let diffs = layer_differences(&base_set, &tuned_set);

    if json {
        let entries: Vec<DiffEntry> = diffs
            .into_iter()
            .map(|d| match d.outcome {
                DiffOutcome::MeanDiff(mean) => DiffEntry {
                    name: d.name,
                    shape_match: true,
                    mean_diff: Some(mean),
                },
                DiffOutcome::ShapeMismatch { .. } => DiffEntry {
                    name: d.name,
                    shape_match: false,
                    mean_diff: None,
                },
            })
            .collect();
        if let Ok(json) = serde_json::to_string_pretty(&entries) {
            println!("{json}");
        }
        return Ok(());
    }

    if diffs.is_empty() {
        println!("No shared learnable layers to compare");
        return Ok(());
    }

    for diff in &diffs {
        match &diff.outcome {
            DiffOutcome::MeanDiff(_) => println!("{diff}"),
            DiffOutcome::ShapeMismatch { .. } => println!("{}", diff.to_string().yellow()),
        }
    }

    Ok(())
}
