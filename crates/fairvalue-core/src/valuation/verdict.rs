use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Band around market price within which a stock counts as fairly valued.
/// Fraction of market price: 0.15 = ±15%.
pub const MARKET_PRICE_BAND: Decimal = dec!(0.15);

/// Valuation verdict relative to a market price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Undervalued,
    FairlyValued,
    Overvalued,
}

/// Classify a fair value against a market price.
///
/// Fairly valued when |fair - market| is strictly inside the ±15% band of
/// the market price; outside the band, strictly greater means undervalued.
/// Returns None for a non-positive market price, where the band is
/// undefined. The market price is display-layer data; `valuate` itself
/// never consumes it.
pub fn classify(fair_value: Money, market_price: Money) -> Option<Verdict> {
    if market_price <= Decimal::ZERO {
        return None;
    }

    let band = market_price * MARKET_PRICE_BAND;
    let verdict = if (fair_value - market_price).abs() < band {
        Verdict::FairlyValued
    } else if fair_value > market_price {
        Verdict::Undervalued
    } else {
        Verdict::Overvalued
    };
    Some(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_band_is_fairly_valued() {
        assert_eq!(
            classify(dec!(114.99), dec!(100)),
            Some(Verdict::FairlyValued)
        );
        assert_eq!(
            classify(dec!(85.01), dec!(100)),
            Some(Verdict::FairlyValued)
        );
    }

    #[test]
    fn test_band_edge_is_exclusive() {
        // Exactly 15% above: band test is strict, so this is undervalued
        assert_eq!(classify(dec!(115), dec!(100)), Some(Verdict::Undervalued));
        assert_eq!(classify(dec!(85), dec!(100)), Some(Verdict::Overvalued));
    }

    #[test]
    fn test_far_from_market() {
        assert_eq!(classify(dec!(200), dec!(100)), Some(Verdict::Undervalued));
        assert_eq!(classify(dec!(40), dec!(100)), Some(Verdict::Overvalued));
    }

    #[test]
    fn test_non_positive_market_price_unclassifiable() {
        assert_eq!(classify(dec!(100), Decimal::ZERO), None);
        assert_eq!(classify(dec!(100), dec!(-5)), None);
    }
}
