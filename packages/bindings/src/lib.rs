use napi::Result as NapiResult;
use napi_derive::napi;

use rust_decimal::Decimal;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn run_valuation(input_json: String) -> NapiResult<String> {
    let input: fairvalue_core::valuation::dcf::ValuationAssumptions =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fairvalue_core::valuation::dcf::valuate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let request: fairvalue_core::sensitivity::SweepRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fairvalue_core::sensitivity::sweep(
        &request.spec,
        &request.ebit_axis,
        &request.growth_axis,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[napi]
pub fn classify_fair_value(fair_value: String, market_price: String) -> NapiResult<String> {
    let fair: Decimal = fair_value.parse().map_err(to_napi_error)?;
    let market: Decimal = market_price.parse().map_err(to_napi_error)?;
    let verdict = fairvalue_core::valuation::verdict::classify(fair, market);
    serde_json::to_string(&verdict).map_err(to_napi_error)
}
