//! Alsvid Command-Line Interface
//!
//! Compiles an `OpenQASM` 2.0 source file and samples it with the dense
//! state-vector simulator:
//!
//! ```text
//! alsvid <filename> <iterations>
//! ```
//!
//! Each iteration is one shot from a fresh |0...0⟩ state; the accumulated
//! histogram over the classical registers is printed at the end.

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use alsvid_sim::Simulator;

/// Alsvid - OPENQASM 2.0 compiler and state-vector simulator
#[derive(Parser)]
#[command(name = "alsvid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OPENQASM 2.0 source file
    filename: String,

    /// Number of shots to execute
    #[arg(value_parser = parse_iterations)]
    iterations: u64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The iteration count must be plain decimal digits — no sign, no spaces.
fn parse_iterations(text: &str) -> Result<u64, String> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err("must be a non-negative whole number".to_string());
    }
    text.parse().map_err(|err| format!("{err}"))
}

fn main() {
    // Usage problems exit with code 1, not clap's default 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

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
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {e:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ast = alsvid_qasm2::parse_file(&cli.filename)?;
    let program = alsvid_compile::compile(&ast)?;

    println!(
        "{} Compiled {} ({} qubits, {} bits, {} instructions)",
        style("→").cyan().bold(),
        style(&cli.filename).green(),
        program.qubit_count(),
        program.bit_count(),
        program.instructions().len()
    );

    let mut simulator = Simulator::new(program);

    let bar = ProgressBar::new(cli.iterations);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} shots")
            .unwrap(),
    );

    for _ in 0..cli.iterations {
        simulator.run_shot()?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!();
    println!("{}", style("Results:").bold());
    simulator.write_results(&mut std::io::stdout().lock())?;

    Ok(())
}
