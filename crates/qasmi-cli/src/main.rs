//! qasmi Command-Line Interface
//!
//! Lex, parse, run or interactively evaluate OpenQASM 3 subset programs on
//! the built-in statevector simulator.
//!
//! ```text
//! qasmi lex   shor.qasm
//! qasmi parse shor.qasm --json
//! qasmi run   shor.qasm --seed 7
//! qasmi repl
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::EvalArgs;
use commands::{lex, parse, repl, run, version};

/// qasmi - an interpreter for a subset of OpenQASM 3
#[derive(Parser)]
#[command(name = "qasmi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a source file
    Lex {
        /// Input file
        file: PathBuf,
    },

    /// Parse a source file and print it in canonical form
    Parse {
        /// Input file
        file: PathBuf,

        /// Print the syntax tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a program and print the final register state
    Run {
        /// Input file
        file: PathBuf,

        #[command(flatten)]
        eval: EvalArgs,

        /// Print snapshots and the final state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate statements interactively
    Repl {
        #[command(flatten)]
        eval: EvalArgs,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Lex { file } => lex::execute(&file),
        Commands::Parse { file, json } => parse::execute(&file, json),
        Commands::Run { file, eval, json } => run::execute(&file, &eval, json),
        Commands::Repl { eval } => repl::execute(&eval),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
