mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::sensitivity::SensitivityArgs;
use commands::valuation::ValuateArgs;

/// Multi-stage DCF fair-value calculations
#[derive(Parser)]
#[command(
    name = "fv",
    version,
    about = "Multi-stage DCF fair-value calculations",
    long_about = "A CLI for valuing equities with a multi-stage discounted cash flow \
                  model at decimal precision. Projects a year-by-year free-cash-flow \
                  schedule, discounts it with a Gordon growth terminal value, and \
                  sweeps fair value across an EBIT-margin x growth grid."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a multi-stage DCF valuation
    Valuate(ValuateArgs),
    /// Sweep fair value across an EBIT-margin x growth grid
    Sensitivity(SensitivityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Valuate(args) => commands::valuation::run_valuate(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Version => {
            println!("fv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
