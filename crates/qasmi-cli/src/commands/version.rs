//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - OpenQASM 3 subset interpreter",
        style("qasmi").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qasmi-qasm3        Lexer, parser and syntax tree");
    println!("  qasmi-eval         Environment and evaluator");
    println!("  qasmi-hal          Backend abstraction and gate matrices");
    println!("  qasmi-adapter-sim  Statevector simulator");
    println!("  qasmi-cli          Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style(env!("CARGO_PKG_REPOSITORY")).underlined()
    );
    println!("License:    {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
