//! Full model comparison pipeline.
//!
//! Loads both models, verifies structure, optionally reports per-layer
//! mean differences, then flattens the learnable parameters of each
//! model and reports the percentage of positions where the finetuned
//! weight is greater than or equal to the base weight.
//!
//! A structural mismatch halts the pipeline: no flattening or statistic
//! runs on mismatched structures.

use crate::error::{CliError, Result};
use crate::source::load_model;
use colored::Colorize;
use cotejar::{
    compare_structure, flatten_learnable, ge_percentage, layer_differences, DiffOutcome,
    StructureReport,
};
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
struct CompareOutput {
    structure_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mismatch_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trainable_weights: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    positive_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layer_diffs: Option<Vec<LayerDiffEntry>>,
}

#[derive(Serialize)]
struct LayerDiffEntry {
    name: String,
    shape_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean_diff: Option<f64>,
}

/// Run the compare command
pub(crate) fn run(base: &str, finetuned: &str, show_diff: bool, json: bool) -> Result<()> {
    let base_set = load_model(base, "base", json)?;
    let tuned_set = load_model(finetuned, "finetuned", json)?;

    let report = compare_structure(&base_set, &tuned_set);
    if let StructureReport::Mismatch { key, missing_from } = &report {
        if json {
            print_json(&CompareOutput {
                structure_match: false,
                mismatch_key: Some(key.clone()),
                missing_from: Some(side_label(*missing_from).to_string()),
                trainable_weights: None,
                positive_percentage: None,
                elapsed_seconds: None,
                layer_diffs: None,
            });
        } else {
            println!("{} {}", "✗".red(), report.summary().red());
        }
        return Err(CliError::ValidationFailed(report.summary()));
    }

    if !json {
        println!("{} {}", "✓".green(), report.summary().green());
        println!();
    }

    let diffs = if show_diff {
        let diffs = layer_differences(&base_set, &tuned_set);
        if !json {
            for diff in &diffs {
                match &diff.outcome {
                    DiffOutcome::MeanDiff(_) => println!("{diff}"),
                    DiffOutcome::ShapeMismatch { .. } => {
                        println!("{}", diff.to_string().yellow());
                    }
                }
            }
            println!();
        }
        Some(diffs)
    } else {
        None
    };

    let base_weights = flatten_learnable(&base_set);
    let tuned_weights = flatten_learnable(&tuned_set);

    if !json {
        println!("Amount of trainable weights: {}", tuned_weights.len());
    }

    let start = Instant::now();
    let percentage = ge_percentage(&base_weights, &tuned_weights)?;
    let elapsed = start.elapsed().as_secs_f64();

    if json {
        print_json(&CompareOutput {
            structure_match: true,
            mismatch_key: None,
            missing_from: None,
            trainable_weights: Some(tuned_weights.len()),
            positive_percentage: Some(percentage),
            elapsed_seconds: Some(elapsed),
            layer_diffs: diffs.map(|diffs| {
                diffs
                    .into_iter()
                    .map(|d| match d.outcome {
                        DiffOutcome::MeanDiff(mean) => LayerDiffEntry {
                            name: d.name,
                            shape_match: true,
                            mean_diff: Some(mean),
                        },
                        DiffOutcome::ShapeMismatch { .. } => LayerDiffEntry {
                            name: d.name,
                            shape_match: false,
                            mean_diff: None,
                        },
                    })
                    .collect()
            }),
        });
    } else {
        println!(
            "Percentage of positive weights: {}",
            format!("{percentage:.2}%").bold()
        );
        println!("Time taken: {elapsed:.3}s");
    }

    Ok(())
}

pub(crate) fn side_label(side: cotejar::Side) -> &'static str {
    match side {
        cotejar::Side::Base => "base",
        cotejar::Side::Finetuned => "finetuned",
    }
}

fn print_json(output: &CompareOutput) {
    if let Ok(json) = serde_json::to_string_pretty(output) {
        println!("{json}");
    }
}
