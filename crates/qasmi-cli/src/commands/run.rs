//! Run command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use tracing::info;

use qasmi_eval::{Evaluator, Snapshot};

use super::common::{EvalArgs, load_program, print_snapshot};

/// JSON output of `qasmi run --json`.
#[derive(Debug, Serialize)]
struct RunReport {
    output: Vec<Snapshot>,
    final_state: Snapshot,
}

/// Execute the run command.
pub fn execute(file: &Path, args: &EvalArgs, json: bool) -> Result<()> {
    let program = load_program(file)?;
    let config = args.config();
    info!(seed = ?config.seed, max_depth = config.max_depth, "Evaluating {}", file.display());

    let mut evaluator = Evaluator::with_config(config);
    let result = evaluator.eval_program(&program);
    let output = evaluator.take_output();

    if json {
        result.context("Evaluation failed")?;
        let report = RunReport {
            output,
            final_state: evaluator.snapshot(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for snapshot in &output {
        print_snapshot(snapshot);
    }
    result.context("Evaluation failed")?;

    println!("{} Final state", style("→").cyan().bold());
    print_snapshot(&evaluator.snapshot());
    Ok(())
}
