use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FairvalueError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SweepAxis};
use crate::valuation::dcf::{valuate, ValuationAssumptions};
use crate::FairvalueResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Assumptions held fixed across a sensitivity sweep: the full valuation
/// record minus `ebit_margin` and `growth_y`, which arrive as axis centres.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensitivitySpec {
    pub base_revenue: Money,
    pub net_debt: Money,
    pub shares_outstanding: Decimal,
    pub depreciation_pct: Percent,
    pub capex_pct: Percent,
    pub wc_change_pct: Percent,
    pub tax_rate: Percent,
    pub interest_pct: Percent,
    pub x_years: u32,
    pub growth_x: Percent,
    pub y_years: u32,
    pub growth_terminal: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

impl SensitivitySpec {
    /// Materialise full valuation assumptions at one grid point.
    pub fn at_point(&self, ebit_margin: Percent, growth_y: Percent) -> ValuationAssumptions {
        ValuationAssumptions {
            base_revenue: self.base_revenue,
            net_debt: self.net_debt,
            shares_outstanding: self.shares_outstanding,
            ebit_margin,
            depreciation_pct: self.depreciation_pct,
            capex_pct: self.capex_pct,
            wc_change_pct: self.wc_change_pct,
            tax_rate: self.tax_rate,
            interest_pct: self.interest_pct,
            x_years: self.x_years,
            growth_x: self.growth_x,
            y_years: self.y_years,
            growth_y,
            growth_terminal: self.growth_terminal,
            ticker: self.ticker.clone(),
        }
    }
}

/// A complete sweep request as it arrives over the wire: the fixed spec
/// plus the two axis definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepRequest {
    pub spec: SensitivitySpec,
    pub ebit_axis: SweepAxis,
    pub growth_axis: SweepAxis,
}

/// Output of a 2-way fair-value sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    /// EBIT-margin values, one per matrix row
    pub ebit_values: Vec<Percent>,
    /// Growth-rate values, one per matrix column
    pub growth_values: Vec<Percent>,
    /// Row-major fair values per share: EBIT varies down rows, growth
    /// across columns, matching the display table orientation
    pub fair_values: Vec<Vec<Money>>,
    /// Fair value at the axis centres
    pub base_case_value: Money,
    /// Position of the base case in the matrix (row, col)
    pub base_case_position: (usize, usize),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Sweep fair value per share across an (EBIT margin, transition growth)
/// grid, holding all other assumptions fixed.
///
/// Every cell is an independent valuation of `spec.at_point(ebit, growth)`.
/// Failure policy: any cell error aborts the whole sweep. Only the two
/// swept fields vary and neither participates in a validity constraint,
/// so a failing cell means the spec itself is invalid.
pub fn sweep(
    spec: &SensitivitySpec,
    ebit_axis: &SweepAxis,
    growth_axis: &SweepAxis,
) -> FairvalueResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_axis("ebit_axis", ebit_axis)?;
    validate_axis("growth_axis", growth_axis)?;

    let ebit_values = ebit_axis.values();
    let growth_values = growth_axis.values();

    let mut fair_values = Vec::with_capacity(ebit_values.len());
    for ebit in &ebit_values {
        let mut row = Vec::with_capacity(growth_values.len());
        for growth in &growth_values {
            let cell = valuate(&spec.at_point(*ebit, *growth))?;
            row.push(cell.result.fair_value_per_share);
        }
        fair_values.push(row);
    }

    // The axis centre sits at index `steps` by construction
    let base_case_position = (ebit_axis.steps as usize, growth_axis.steps as usize);
    let base_case_value = fair_values[base_case_position.0][base_case_position.1];

    let output = SensitivityOutput {
        ebit_values,
        growth_values,
        fair_values,
        base_case_value,
        base_case_position,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "2-Way Fair Value Sensitivity (EBIT margin x transition growth)",
        &serde_json::json!({
            "spec": spec,
            "ebit_axis": ebit_axis,
            "growth_axis": growth_axis,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_axis(field: &str, axis: &SweepAxis) -> FairvalueResult<()> {
    if axis.step_size <= Decimal::ZERO {
        return Err(FairvalueError::InvalidInput {
            field: field.into(),
            reason: "Step size must be positive".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
