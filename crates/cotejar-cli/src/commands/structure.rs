//! Structure check command.
//!
//! Verifies two models expose identical parameter key sets. With
//! `--verbose`, lists every layer's name and shape for both models
//! before the verdict.

use crate::commands::compare::side_label;
use crate::error::{CliError, Result};
use crate::source::load_model;
use colored::Colorize;
use cotejar::params::ParamSet;
use cotejar::{compare_structure, StructureReport};
use serde::Serialize;

#[derive(Serialize)]
struct StructureOutput {
    structure_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mismatch_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_from: Option<String>,
    base_layers: usize,
    finetuned_layers: usize,
}

/// Run the structure command
pub(crate) fn run(base: &str, finetuned: &str, verbose: bool, json: bool) -> Result<()> {
    let base_set = load_model(base, "base", json)?;
    let tuned_set = load_model(finetuned, "finetuned", json)?;

    if verbose && !json {
        print_layers("Base model", &base_set);
        print_layers("Finetuned model", &tuned_set);
    }

    let report = compare_structure(&base_set, &tuned_set);

    if json {
        let (mismatch_key, missing_from) = match &report {
            StructureReport::Match => (None, None),
            StructureReport::Mismatch { key, missing_from } => (
                Some(key.clone()),
                Some(side_label(*missing_from).to_string()),
            ),
        };
        let output = StructureOutput {
            structure_match: report.is_match(),
            mismatch_key,
            missing_from,
            base_layers: base_set.len(),
            finetuned_layers: tuned_set.len(),
        };
        if let Ok(json) = serde_json::to_string_pretty(&output) {
            println!("{json}");
        }
    } else if report.is_match() {
        println!("{} {}", "✓".green(), report.summary().green());
    } else {
        println!("{} {}", "✗".red(), report.summary().red());
    }

    if !report.is_match() {
        return Err(CliError::ValidationFailed(report.summary()));
    }

    Ok(())
}

fn print_layers(title: &str, set: &ParamSet) {
    println!("{}", format!("{title}:").bold());
    for (name, entry) in set.iter() {
        println!("  Layer: {name}, Shape: {:?}", entry.tensor.shape());
    }
    println!();
}
