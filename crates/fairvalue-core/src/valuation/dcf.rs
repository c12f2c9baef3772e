use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FairvalueError;
use crate::time_value::discount_factor;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, ProjectionPeriod};
use crate::FairvalueResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input assumptions for a multi-stage DCF valuation.
///
/// All rates and margins are in percent units (`18.5` = 18.5%). The growth
/// schedule has three phases: `growth_x` for years `1..=x_years`, `growth_y`
/// for years `x_years+1..=y_years`, and `growth_terminal` in perpetuity
/// beyond the explicit horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValuationAssumptions {
    /// Latest annual revenue (Year 0, currency units)
    pub base_revenue: Money,
    /// Debt minus cash; negative means net cash
    pub net_debt: Money,
    /// Diluted shares outstanding, in the reported unit
    pub shares_outstanding: Decimal,
    /// EBIT as a percentage of revenue
    pub ebit_margin: Percent,
    /// Depreciation as a percentage of revenue
    pub depreciation_pct: Percent,
    /// Capital expenditure as a percentage of revenue
    pub capex_pct: Percent,
    /// Change in working capital as a percentage of revenue
    pub wc_change_pct: Percent,
    /// Tax rate applied directly to EBIT (unlevered FCF model)
    pub tax_rate: Percent,
    /// Discount rate (WACC), percent
    pub interest_pct: Percent,
    /// Length of the high-growth phase in years
    pub x_years: u32,
    /// Revenue growth during the high-growth phase, percent
    pub growth_x: Percent,
    /// Total explicit projection horizon in years; must be >= x_years
    pub y_years: u32,
    /// Revenue growth during the transition phase, percent
    pub growth_y: Percent,
    /// Perpetual growth beyond the horizon; must be < interest_pct
    pub growth_terminal: Percent,
    /// Opaque identifying label, echoed back untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

/// One projected year of the free-cash-flow schedule, all intermediates
/// retained for display and audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcfRow {
    pub period: ProjectionPeriod,
    pub revenue: Money,
    pub ebit: Money,
    pub tax: Money,
    pub nopat: Money,
    pub plus_depreciation: Money,
    pub less_capex: Money,
    pub less_wc_change: Money,
    pub fcf: Money,
    pub discount_factor: Decimal,
    pub pv_fcf: Money,
}

/// Output of the DCF valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationOutput {
    /// Year-by-year free-cash-flow schedule
    pub fcf_table: Vec<FcfRow>,
    /// Sum of PVs for years 1..=x_years
    pub phase1_pv: Money,
    /// Sum of PVs for years x_years+1..=y_years
    pub phase2_pv: Money,
    /// Gordon growth terminal value, undiscounted
    pub terminal_value: Money,
    /// Terminal value discounted to present
    pub terminal_value_pv: Money,
    /// phase1_pv + phase2_pv + terminal_value_pv
    pub enterprise_value: Money,
    /// Net debt, echoed back
    pub net_debt: Money,
    /// Shares outstanding, echoed back
    pub shares_outstanding: Decimal,
    /// enterprise_value - net_debt
    pub equity_value: Money,
    /// equity_value / shares_outstanding
    pub fair_value_per_share: Money,
    /// Terminal value PV as a percentage of enterprise value, 2 dp.
    /// None when enterprise value is not positive.
    pub terminal_weight: Option<Percent>,
    /// Identifying label, echoed back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

/// Terminal weight above this share of EV triggers a warning, percent.
const TERMINAL_WEIGHT_WARN: Percent = dec!(75);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a 3-stage unlevered FCF DCF valuation.
///
/// Pure and deterministic: the same assumptions always produce the same
/// output, and no state survives the call.
pub fn valuate(
    assumptions: &ValuationAssumptions,
) -> FairvalueResult<ComputationOutput<ValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_assumptions(assumptions)?;

    // --- Project cash flows over the explicit horizon ---
    let fcf_table = build_fcf_schedule(assumptions)?;

    let phase1_pv: Money = fcf_table
        .iter()
        .take(assumptions.x_years as usize)
        .map(|r| r.pv_fcf)
        .sum();
    let phase2_pv: Money = fcf_table
        .iter()
        .skip(assumptions.x_years as usize)
        .map(|r| r.pv_fcf)
        .sum();

    let last = fcf_table.last().ok_or_else(|| {
        FairvalueError::InsufficientData("No projection years generated".into())
    })?;

    // --- Terminal value on the last projected year's FCF ---
    let terminal_value =
        gordon_terminal_value(last.fcf, assumptions.growth_terminal, assumptions.interest_pct)?;
    // Discounted with the same factor as the final explicit year
    let terminal_value_pv = terminal_value * last.discount_factor;

    // --- Equity bridge ---
    let enterprise_value = phase1_pv + phase2_pv + terminal_value_pv;
    let equity_value = enterprise_value - assumptions.net_debt;
    let fair_value_per_share = equity_value / assumptions.shares_outstanding;

    let terminal_weight = if enterprise_value > Decimal::ZERO {
        let weight = (terminal_value_pv / enterprise_value * dec!(100)).round_dp(2);
        if weight > TERMINAL_WEIGHT_WARN {
            warnings.push(format!(
                "Terminal value represents {weight}% of enterprise value; consider extending the explicit horizon"
            ));
        }
        Some(weight)
    } else {
        warnings.push(format!(
            "Enterprise value is {enterprise_value}; terminal weight is undefined"
        ));
        None
    };

    let output = ValuationOutput {
        fcf_table,
        phase1_pv,
        phase2_pv,
        terminal_value,
        terminal_value_pv,
        enterprise_value,
        net_debt: assumptions.net_debt,
        shares_outstanding: assumptions.shares_outstanding,
        equity_value,
        fair_value_per_share,
        terminal_weight,
        ticker: assumptions.ticker.clone(),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "3-Stage Unlevered FCF DCF (Gordon growth terminal)",
        assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_assumptions(a: &ValuationAssumptions) -> FairvalueResult<()> {
    if a.base_revenue <= Decimal::ZERO {
        return Err(FairvalueError::InvalidInput {
            field: "base_revenue".into(),
            reason: "Base revenue must be positive".into(),
        });
    }
    if a.shares_outstanding <= Decimal::ZERO {
        return Err(FairvalueError::InvalidInput {
            field: "shares_outstanding".into(),
            reason: "Shares outstanding must be positive".into(),
        });
    }
    if a.x_years == 0 {
        return Err(FairvalueError::InvalidInput {
            field: "x_years".into(),
            reason: "High-growth phase must be at least 1 year".into(),
        });
    }
    if a.y_years < a.x_years {
        return Err(FairvalueError::InvalidInput {
            field: "y_years".into(),
            reason: "Projection horizon must be >= x_years".into(),
        });
    }
    if a.interest_pct <= Decimal::ZERO {
        return Err(FairvalueError::InvalidInput {
            field: "interest_pct".into(),
            reason: "Discount rate must be positive".into(),
        });
    }

    // Gordon growth model constraint
    if a.interest_pct <= a.growth_terminal {
        return Err(FairvalueError::FinancialImpossibility(format!(
            "Discount rate ({}%) must exceed terminal growth rate ({}%)",
            a.interest_pct, a.growth_terminal
        )));
    }

    Ok(())
}

fn build_fcf_schedule(a: &ValuationAssumptions) -> FairvalueResult<Vec<FcfRow>> {
    let mut rows = Vec::with_capacity(a.y_years as usize);
    let mut revenue = a.base_revenue;

    for year in 1..=a.y_years {
        let growth = if year <= a.x_years {
            a.growth_x
        } else {
            a.growth_y
        };
        revenue *= Decimal::ONE + growth / dec!(100);

        let ebit = revenue * a.ebit_margin / dec!(100);
        let tax = ebit * a.tax_rate / dec!(100);
        let nopat = ebit - tax;
        let depreciation = revenue * a.depreciation_pct / dec!(100);
        let capex = revenue * a.capex_pct / dec!(100);
        let wc_change = revenue * a.wc_change_pct / dec!(100);

        // FCF = NOPAT + depreciation - capex - delta WC
        let fcf = nopat + depreciation - capex - wc_change;

        let df = discount_factor(a.interest_pct, year)?;
        let pv_fcf = fcf * df;

        rows.push(FcfRow {
            period: ProjectionPeriod {
                year: year as i32,
                label: format!("Year {year}"),
                is_terminal: false,
            },
            revenue,
            ebit,
            tax,
            nopat,
            plus_depreciation: depreciation,
            less_capex: capex,
            less_wc_change: wc_change,
            fcf,
            discount_factor: df,
            pv_fcf,
        });
    }

    Ok(rows)
}

fn gordon_terminal_value(
    last_fcf: Money,
    growth_terminal: Percent,
    interest_pct: Percent,
) -> FairvalueResult<Money> {
    let denominator = (interest_pct - growth_terminal) / dec!(100);
    if denominator <= Decimal::ZERO {
        return Err(FairvalueError::FinancialImpossibility(
            "Discount rate must exceed terminal growth rate".into(),
        ));
    }
    Ok(last_fcf * (Decimal::ONE + growth_terminal / dec!(100)) / denominator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_assumptions() -> ValuationAssumptions {
        ValuationAssumptions {
            base_revenue: dec!(1000),
            net_debt: dec!(100),
            shares_outstanding: dec!(10),
            ebit_margin: dec!(20),
            depreciation_pct: dec!(5),
            capex_pct: dec!(6),
            wc_change_pct: dec!(1),
            tax_rate: dec!(25),
            interest_pct: dec!(10),
            x_years: 5,
            growth_x: dec!(15),
            y_years: 10,
            growth_y: dec!(8),
            growth_terminal: dec!(4),
            ticker: None,
        }
    }

    #[test]
    fn test_basic_valuation() {
        let assumptions = sample_assumptions();
        let result = valuate(&assumptions).unwrap();
        let out = &result.result;

        // 10 explicit projection years
        assert_eq!(out.fcf_table.len(), 10);

        // Year 1 revenue = 1000 * 1.15 = 1150
        assert_eq!(out.fcf_table[0].revenue, dec!(1150));

        assert!(out.enterprise_value > Decimal::ZERO);
        assert_eq!(out.equity_value, out.enterprise_value - dec!(100));
        assert_eq!(out.fair_value_per_share, out.equity_value / dec!(10));
        assert_eq!(out.net_debt, dec!(100));
        assert_eq!(out.shares_outstanding, dec!(10));
    }

    #[test]
    fn test_year1_row_arithmetic() {
        let result = valuate(&sample_assumptions()).unwrap();
        let y1 = &result.result.fcf_table[0];

        // Revenue = 1150
        assert_eq!(y1.revenue, dec!(1150));
        // EBIT = 1150 * 0.20 = 230
        assert_eq!(y1.ebit, dec!(230));
        // Tax = 230 * 0.25 = 57.5
        assert_eq!(y1.tax, dec!(57.5));
        // NOPAT = 230 - 57.5 = 172.5
        assert_eq!(y1.nopat, dec!(172.5));
        // Depreciation = 1150 * 0.05 = 57.5
        assert_eq!(y1.plus_depreciation, dec!(57.5));
        // CapEx = 1150 * 0.06 = 69
        assert_eq!(y1.less_capex, dec!(69));
        // WC change = 1150 * 0.01 = 11.5
        assert_eq!(y1.less_wc_change, dec!(11.5));
        // FCF = 172.5 + 57.5 - 69 - 11.5 = 149.5
        assert_eq!(y1.fcf, dec!(149.5));
        // PV = 149.5 / 1.10
        assert!((y1.pv_fcf - dec!(135.909090909090909)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_growth_switches_to_transition_phase() {
        let result = valuate(&sample_assumptions()).unwrap();
        let table = &result.result.fcf_table;

        // Year 6 is the first transition year: revenue[6] = revenue[5] * 1.08
        let expected = table[4].revenue * dec!(1.08);
        assert!((table[5].revenue - expected).abs() < dec!(0.000001));

        // Year 5 is still high-growth: revenue[5] = revenue[4] * 1.15
        let expected_y5 = table[3].revenue * dec!(1.15);
        assert!((table[4].revenue - expected_y5).abs() < dec!(0.000001));
    }

    #[test]
    fn test_phase_split_sums_to_enterprise_value() {
        let result = valuate(&sample_assumptions()).unwrap();
        let out = &result.result;

        let reconstructed = out.phase1_pv + out.phase2_pv + out.terminal_value_pv;
        assert_eq!(out.enterprise_value, reconstructed);
    }

    #[test]
    fn test_degenerate_horizon_has_zero_phase2() {
        let mut assumptions = sample_assumptions();
        assumptions.y_years = assumptions.x_years;

        let result = valuate(&assumptions).unwrap();
        assert_eq!(result.result.phase2_pv, Decimal::ZERO);
    }

    #[test]
    fn test_degenerate_horizon_ignores_growth_y() {
        let mut a = sample_assumptions();
        a.y_years = a.x_years;
        let base = valuate(&a).unwrap();

        // growth_y never applies when no transition years exist
        a.growth_y = dec!(99);
        let altered = valuate(&a).unwrap();

        assert_eq!(
            base.result.fair_value_per_share,
            altered.result.fair_value_per_share
        );
    }

    #[test]
    fn test_terminal_growth_at_discount_rate_rejected() {
        let mut assumptions = sample_assumptions();
        assumptions.growth_terminal = dec!(10); // == interest_pct

        assert!(valuate(&assumptions).is_err());
    }

    #[test]
    fn test_terminal_growth_above_discount_rate_rejected() {
        let mut assumptions = sample_assumptions();
        assumptions.interest_pct = dec!(5);
        assumptions.growth_terminal = dec!(6);

        let result = valuate(&assumptions);
        assert!(matches!(
            result,
            Err(FairvalueError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_non_positive_revenue_rejected() {
        let mut assumptions = sample_assumptions();
        assumptions.base_revenue = dec!(-100);
        assert!(valuate(&assumptions).is_err());

        assumptions.base_revenue = Decimal::ZERO;
        assert!(valuate(&assumptions).is_err());
    }

    #[test]
    fn test_non_positive_shares_rejected() {
        let mut assumptions = sample_assumptions();
        assumptions.shares_outstanding = Decimal::ZERO;
        assert!(valuate(&assumptions).is_err());
    }

    #[test]
    fn test_zero_x_years_rejected() {
        let mut assumptions = sample_assumptions();
        assumptions.x_years = 0;
        assert!(valuate(&assumptions).is_err());
    }

    #[test]
    fn test_horizon_shorter_than_high_growth_rejected() {
        let mut assumptions = sample_assumptions();
        assumptions.x_years = 8;
        assumptions.y_years = 5;

        let result = valuate(&assumptions);
        assert!(matches!(
            result,
            Err(FairvalueError::InvalidInput { ref field, .. }) if field == "y_years"
        ));
    }

    #[test]
    fn test_zero_discount_rate_rejected() {
        let mut assumptions = sample_assumptions();
        assumptions.interest_pct = Decimal::ZERO;
        assumptions.growth_terminal = dec!(-1);
        assert!(valuate(&assumptions).is_err());
    }

    #[test]
    fn test_terminal_weight_is_rounded_percentage() {
        let result = valuate(&sample_assumptions()).unwrap();
        let weight = result.result.terminal_weight.unwrap();

        assert!(weight > Decimal::ZERO && weight < dec!(100));
        // 2 decimal places
        assert_eq!(weight, weight.round_dp(2));
    }

    #[test]
    fn test_net_cash_raises_equity_above_enterprise_value() {
        let mut assumptions = sample_assumptions();
        assumptions.net_debt = dec!(-250);

        let result = valuate(&assumptions).unwrap();
        let out = &result.result;
        assert_eq!(out.equity_value, out.enterprise_value + dec!(250));
    }

    #[test]
    fn test_ticker_echoed_back() {
        let mut assumptions = sample_assumptions();
        assumptions.ticker = Some("INFY".into());

        let result = valuate(&assumptions).unwrap();
        assert_eq!(result.result.ticker.as_deref(), Some("INFY"));
    }

    #[test]
    fn test_methodology() {
        let result = valuate(&sample_assumptions()).unwrap();
        assert_eq!(
            result.methodology,
            "3-Stage Unlevered FCF DCF (Gordon growth terminal)"
        );
    }

    #[test]
    fn test_unknown_field_rejected_at_boundary() {
        let mut value = serde_json::to_value(sample_assumptions()).unwrap();
        value
            .as_object_mut()
            .unwrap()
            .insert("current_price".into(), serde_json::json!("123.45"));

        let parsed: Result<ValuationAssumptions, _> = serde_json::from_value(value);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_missing_field_rejected_at_boundary() {
        let mut value = serde_json::to_value(sample_assumptions()).unwrap();
        value.as_object_mut().unwrap().remove("tax_rate");

        let parsed: Result<ValuationAssumptions, _> = serde_json::from_value(value);
        assert!(parsed.is_err());
    }
}
