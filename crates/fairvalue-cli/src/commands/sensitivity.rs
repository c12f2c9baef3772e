use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fairvalue_core::sensitivity::{self, SensitivitySpec, SweepRequest};
use fairvalue_core::types::SweepAxis;

use crate::input;

/// Arguments for a fair-value sensitivity sweep
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SensitivityArgs {
    /// Path to JSON input file: { "spec": ..., "ebit_axis": ..., "growth_axis": ... }
    #[arg(long)]
    pub input: Option<String>,

    /// Latest annual revenue (currency units)
    #[arg(long)]
    pub base_revenue: Option<Decimal>,

    /// Net debt; negative for net cash
    #[arg(long)]
    pub net_debt: Option<Decimal>,

    /// Diluted shares outstanding
    #[arg(long)]
    pub shares_outstanding: Option<Decimal>,

    /// Depreciation, percent of revenue
    #[arg(long)]
    pub depreciation_pct: Option<Decimal>,

    /// Capital expenditure, percent of revenue
    #[arg(long)]
    pub capex_pct: Option<Decimal>,

    /// Working-capital change, percent of revenue
    #[arg(long)]
    pub wc_change_pct: Option<Decimal>,

    /// Tax rate on EBIT, percent
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Discount rate (WACC), percent
    #[arg(long, alias = "wacc")]
    pub interest_pct: Option<Decimal>,

    /// High-growth phase length in years
    #[arg(long)]
    pub x_years: Option<u32>,

    /// Revenue growth during the high-growth phase, percent
    #[arg(long)]
    pub growth_x: Option<Decimal>,

    /// Total explicit projection horizon in years
    #[arg(long)]
    pub y_years: Option<u32>,

    /// Perpetual growth beyond the horizon, percent
    #[arg(long)]
    pub growth_terminal: Option<Decimal>,

    /// Centre of the EBIT-margin axis, percent
    #[arg(long)]
    pub ebit_margin: Option<Decimal>,

    /// Centre of the transition-growth axis, percent
    #[arg(long)]
    pub growth_y: Option<Decimal>,

    /// Grid points either side of the EBIT-margin centre
    #[arg(long, default_value = "3")]
    pub ebit_steps: u32,

    /// Increment between EBIT-margin points, percent
    #[arg(long, default_value = "1")]
    pub ebit_step_size: Decimal,

    /// Grid points either side of the growth centre
    #[arg(long, default_value = "3")]
    pub growth_steps: u32,

    /// Increment between growth points, percent
    #[arg(long, default_value = "1")]
    pub growth_step_size: Decimal,

    /// Identifying label, echoed back untouched
    #[arg(long)]
    pub ticker: Option<String>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SweepRequest = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        SweepRequest {
            spec: SensitivitySpec {
                base_revenue: args
                    .base_revenue
                    .ok_or("--base-revenue is required (or provide --input)")?,
                net_debt: args
                    .net_debt
                    .ok_or("--net-debt is required (or provide --input)")?,
                shares_outstanding: args
                    .shares_outstanding
                    .ok_or("--shares-outstanding is required (or provide --input)")?,
                depreciation_pct: args
                    .depreciation_pct
                    .ok_or("--depreciation-pct is required (or provide --input)")?,
                capex_pct: args
                    .capex_pct
                    .ok_or("--capex-pct is required (or provide --input)")?,
                wc_change_pct: args
                    .wc_change_pct
                    .ok_or("--wc-change-pct is required (or provide --input)")?,
                tax_rate: args
                    .tax_rate
                    .ok_or("--tax-rate is required (or provide --input)")?,
                interest_pct: args
                    .interest_pct
                    .ok_or("--interest-pct is required (or provide --input)")?,
                x_years: args
                    .x_years
                    .ok_or("--x-years is required (or provide --input)")?,
                growth_x: args
                    .growth_x
                    .ok_or("--growth-x is required (or provide --input)")?,
                y_years: args
                    .y_years
                    .ok_or("--y-years is required (or provide --input)")?,
                growth_terminal: args
                    .growth_terminal
                    .ok_or("--growth-terminal is required (or provide --input)")?,
                ticker: args.ticker,
            },
            ebit_axis: SweepAxis {
                center: args
                    .ebit_margin
                    .ok_or("--ebit-margin is required (or provide --input)")?,
                steps: args.ebit_steps,
                step_size: args.ebit_step_size,
            },
            growth_axis: SweepAxis {
                center: args
                    .growth_y
                    .ok_or("--growth-y is required (or provide --input)")?,
                steps: args.growth_steps,
                step_size: args.growth_step_size,
            },
        }
    };

    let result = sensitivity::sweep(&request.spec, &request.ebit_axis, &request.growth_axis)?;
    Ok(serde_json::to_value(result)?)
}
