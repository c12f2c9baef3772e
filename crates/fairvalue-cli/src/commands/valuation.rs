use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fairvalue_core::valuation::dcf::{self, ValuationAssumptions};

use crate::input;

/// Arguments for a DCF valuation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ValuateArgs {
    /// Path to JSON input file (overrides individual flags)
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

    /// EBIT margin, percent of revenue
    #[arg(long)]
    pub ebit_margin: Option<Decimal>,

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

    /// Revenue growth during the transition phase, percent
    #[arg(long)]
    pub growth_y: Option<Decimal>,

    /// Perpetual growth beyond the horizon, percent
    #[arg(long)]
    pub growth_terminal: Option<Decimal>,

    /// Identifying label, echoed back untouched
    #[arg(long)]
    pub ticker: Option<String>,
}

pub fn run_valuate(args: ValuateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions: ValuationAssumptions = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ValuationAssumptions {
            base_revenue: args
                .base_revenue
                .ok_or("--base-revenue is required (or provide --input)")?,
            net_debt: args
                .net_debt
                .ok_or("--net-debt is required (or provide --input)")?,
            shares_outstanding: args
                .shares_outstanding
                .ok_or("--shares-outstanding is required (or provide --input)")?,
            ebit_margin: args
                .ebit_margin
                .ok_or("--ebit-margin is required (or provide --input)")?,
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
            growth_y: args
                .growth_y
                .ok_or("--growth-y is required (or provide --input)")?,
            growth_terminal: args
                .growth_terminal
                .ok_or("--growth-terminal is required (or provide --input)")?,
            ticker: args.ticker,
        }
    };

    let result = dcf::valuate(&assumptions)?;
    Ok(serde_json::to_value(result)?)
}
