use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::FairvalueError;
use crate::types::{Money, Percent};
use crate::FairvalueResult;

/// End-of-year discount factor: 1 / (1 + rate/100)^period.
///
/// The rate is in percent units, matching the rest of the engine.
pub fn discount_factor(rate_pct: Percent, period: u32) -> FairvalueResult<Decimal> {
    let rate = rate_pct / dec!(100);
    if rate <= dec!(-1) {
        return Err(FairvalueError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let compounded = (Decimal::ONE + rate).powi(period as i64);
    if compounded.is_zero() {
        return Err(FairvalueError::DivisionByZero {
            context: format!("discount factor at period {period}"),
        });
    }

    Ok(Decimal::ONE / compounded)
}

/// Net Present Value of a series of cash flows. The flow at index 0 is
/// undiscounted; index t is discounted over t whole years.
pub fn npv(rate_pct: Percent, cash_flows: &[Money]) -> FairvalueResult<Money> {
    let rate = rate_pct / dec!(100);
    if rate <= dec!(-1) {
        return Err(FairvalueError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(FairvalueError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}
