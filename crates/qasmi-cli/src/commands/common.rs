//! Shared helpers for CLI commands.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use tracing::debug;

use qasmi_eval::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_QUBITS, DEFAULT_MAX_UNROLL, EvalConfig, Snapshot};
use qasmi_qasm3::read_source;
use qasmi_qasm3::syntax::Program;

/// Evaluation settings shared by `run` and `repl`.
#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    /// Seed for measurement sampling (random if omitted)
    #[arg(long, env = "QASMI_SEED")]
    pub seed: Option<u64>,

    /// Maximum depth of nested gate and subroutine calls
    #[arg(long, env = "QASMI_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Maximum number of simulated qubits
    #[arg(long, env = "QASMI_MAX_QUBITS", default_value_t = DEFAULT_MAX_QUBITS)]
    pub max_qubits: usize,

    /// Maximum statements a gate body may expand to under `pow`
    #[arg(long, env = "QASMI_MAX_UNROLL", default_value_t = DEFAULT_MAX_UNROLL)]
    pub max_unroll: usize,
}

impl EvalArgs {
    pub fn config(&self) -> EvalConfig {
        let config = EvalConfig::default()
            .with_max_depth(self.max_depth)
            .with_max_qubits(self.max_qubits)
            .with_max_unroll(self.max_unroll);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

/// Read a whole source file.
pub fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let (source, errors) = read_source(BufReader::new(file));
    if let Some(err) = errors.into_iter().next() {
        return Err(err).with_context(|| format!("Failed to read file: {}", path.display()));
    }
    debug!(path = %path.display(), bytes = source.len(), "read source");
    Ok(source)
}

/// Read and parse a source file. All parse errors are reported together.
pub fn load_program(path: &Path) -> Result<Program> {
    let source = read_file(path)?;
    qasmi_qasm3::parse(&source).map_err(|errors| {
        anyhow::anyhow!(
            "Parse failed with {} error(s):\n{}",
            errors.len(),
            errors
        )
    })
}

/// Print a snapshot, qubit register layout first.
pub fn print_snapshot(snapshot: &Snapshot) {
    if !snapshot.qubits.is_empty() {
        let names: Vec<String> = snapshot
            .qubits
            .iter()
            .map(|reg| format!("{}[{}]", reg.name, reg.qubits.len()))
            .collect();
        println!("{} {}", style("qubits:").dim(), names.join(" "));
    }
    print!("{snapshot}");
}
