use crate::error::{TradingError, TradingResult};
use crate::types::SizingInputs;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Converts a cash-at-risk fraction of available cash into a whole share count.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSizer;

impl PositionSizer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Calculate share quantity for a new position
    ///
    /// `quantity = round(cash * cash_at_risk / last_price)`, rounded half to even
    /// (`2.5 -> 2`, `3.5 -> 4`). A result that rounds to zero or below is
    /// returned as `0`; callers treat that as insufficient sizing. A count above
    /// `u64::MAX` saturates.
    ///
    /// # Errors
    /// Returns [`TradingError::InvalidPrice`] if `last_price <= 0`, or
    /// [`TradingError::SizingOverflow`] if the intermediate value overflows.
    pub fn size(&self, inputs: &SizingInputs) -> TradingResult<u64> {
        if inputs.last_price <= Decimal::ZERO {
            return Err(TradingError::InvalidPrice {
                price: inputs.last_price,
            });
        }

        let raw = inputs
            .cash
            .checked_mul(inputs.cash_at_risk)
            .and_then(|at_risk| at_risk.checked_div(inputs.last_price))
            .ok_or(TradingError::SizingOverflow {
                cash: inputs.cash,
                price: inputs.last_price,
            })?;
        let rounded = raw.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);

        if rounded <= Decimal::ZERO {
            return Ok(0);
        }

        Ok(rounded.to_u64().unwrap_or(u64::MAX))
    }
}

/// Converts a configured fractional rate to `Decimal`.
///
/// # Errors
/// Returns [`TradingError::InvalidConfig`] for NaN or infinite values.
pub fn rate_to_decimal(name: &str, value: f64) -> TradingResult<Decimal> {
    Decimal::try_from(value)
        .map_err(|e| TradingError::InvalidConfig(format!("{name} = {value} is not representable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(cash: Decimal, last_price: Decimal, cash_at_risk: Decimal) -> SizingInputs {
        SizingInputs {
            cash,
            last_price,
            cash_at_risk,
        }
    }

    #[test]
    fn test_basic_position_sizing() {
        // $1000 × 0.5 = $500 → $500 / $100 = 5 shares
        let quantity = PositionSizer::new()
            .size(&inputs(dec!(1000), dec!(100), dec!(0.5)))
            .unwrap();
        assert_eq!(quantity, 5);
    }

    #[test]
    fn test_rounds_to_nearest_share() {
        // 1000 × 0.5 / 300 = 1.666.. → 2
        let quantity = PositionSizer::new()
            .size(&inputs(dec!(1000), dec!(300), dec!(0.5)))
            .unwrap();
        assert_eq!(quantity, 2);

        // 1000 × 0.5 / 450 = 1.111.. → 1
        let quantity = PositionSizer::new()
            .size(&inputs(dec!(1000), dec!(450), dec!(0.5)))
            .unwrap();
        assert_eq!(quantity, 1);
    }

    #[test]
    fn test_half_rounds_to_even() {
        let sizer = PositionSizer::new();
        // 2.5 → 2
        assert_eq!(sizer.size(&inputs(dec!(250), dec!(100), dec!(1))).unwrap(), 2);
        // 3.5 → 4
        assert_eq!(sizer.size(&inputs(dec!(350), dec!(100), dec!(1))).unwrap(), 4);
        // 0.5 → 0
        assert_eq!(sizer.size(&inputs(dec!(50), dec!(100), dec!(1))).unwrap(), 0);
    }

    #[test]
    fn test_insufficient_cash_sizes_to_zero() {
        let quantity = PositionSizer::new()
            .size(&inputs(dec!(10), dec!(100), dec!(0.5)))
            .unwrap();
        assert_eq!(quantity, 0);
    }

    #[test]
    fn test_negative_cash_sizes_to_zero() {
        let quantity = PositionSizer::new()
            .size(&inputs(dec!(-1000), dec!(100), dec!(0.5)))
            .unwrap();
        assert_eq!(quantity, 0);
    }

    #[test]
    fn test_invalid_price() {
        let sizer = PositionSizer::new();

        let result = sizer.size(&inputs(dec!(1000), dec!(0), dec!(0.5)));
        assert_eq!(result, Err(TradingError::InvalidPrice { price: dec!(0) }));

        let result = sizer.size(&inputs(dec!(1000), dec!(-5), dec!(0.5)));
        assert!(matches!(result, Err(TradingError::InvalidPrice { .. })));
    }

    #[test]
    fn test_overflow_is_error() {
        let result = PositionSizer::new().size(&inputs(
            dec!(70000000000000000000),
            dec!(0.0000000001),
            dec!(0.5),
        ));
        assert_eq!(
            result,
            Err(TradingError::SizingOverflow {
                cash: dec!(70000000000000000000),
                price: dec!(0.0000000001),
            })
        );
    }

    #[test]
    fn test_huge_count_saturates() {
        // 1e24 / 0.01 = 1e26 shares, representable as Decimal but not as u64
        let cash = Decimal::from_i128_with_scale(10_i128.pow(24), 0);
        let quantity = PositionSizer::new()
            .size(&inputs(cash, dec!(0.01), dec!(1)))
            .unwrap();
        assert_eq!(quantity, u64::MAX);
    }

    #[test]
    fn test_rate_to_decimal() {
        assert_eq!(rate_to_decimal("take_profit", 0.3).unwrap(), dec!(0.3));
        assert!(rate_to_decimal("take_profit", f64::NAN).is_err());
        assert!(rate_to_decimal("stop_loss", f64::INFINITY).is_err());
    }
}
