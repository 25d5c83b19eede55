//! cotejar - Model Weight Comparison CLI
//!
//! Usage:
//!   cotejar compare base.safetensors tuned.safetensors   # Full pipeline
//!   cotejar compare org/base org/tuned --diff            # With per-layer diffs
//!   cotejar structure base.safetensors tuned.safetensors # Structure check only
//!   cotejar structure a.safetensors b.safetensors -v     # With per-layer shapes
//!   cotejar diff base.safetensors tuned.safetensors      # Per-layer mean diffs

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;
mod error;
mod source;

use commands::{compare, diff, structure};

/// cotejar - Model Weight Comparison Tool
///
/// Compare the parameter structures and weights of two pretrained model
/// checkpoints (a base model and a finetuned variant). Models are named
/// by local SafeTensors path or Hugging Face Hub "org/name" repo id.
#[derive(Parser)]
#[command(name = "cotejar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full comparison: structure check, flat-vector statistic, elapsed time
    Compare {
        /// Base model (path or org/name repo id)
        #[arg(value_name = "BASE")]
        base: String,

        /// Finetuned model (path or org/name repo id)
        #[arg(value_name = "FINETUNED")]
        finetuned: String,

        /// Also report per-layer mean differences
        #[arg(long)]
        diff: bool,
    },

    /// Check that both models have identical parameter structures
    Structure {
        /// Base model (path or org/name repo id)
        #[arg(value_name = "BASE")]
        base: String,

        /// Finetuned model (path or org/name repo id)
        #[arg(value_name = "FINETUNED")]
        finetuned: String,

        /// List per-layer names and shapes for both models
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report per-layer mean differences (base minus finetuned)
    Diff {
        /// Base model (path or org/name repo id)
        #[arg(value_name = "BASE")]
        base: String,

        /// Finetuned model (path or org/name repo id)
        #[arg(value_name = "FINETUNED")]
        finetuned: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            base,
            finetuned,
            diff,
        } => compare::run(&base, &finetuned, diff, cli.json),

        Commands::Structure {
            base,
            finetuned,
            verbose,
        } => structure::run(&base, &finetuned, verbose, cli.json),

        Commands::Diff { base, finetuned } => diff::run(&base, &finetuned, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
