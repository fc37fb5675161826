use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// A tracked tradable pair. Immutable identity, created at seed time and
/// never mutated by the capture pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: Symbol,
    pub name: String,
}

impl Instrument {
    pub fn new(symbol: Symbol, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyInstrumentName);
        }
        Ok(Self { symbol, name })
    }
}

/// An immutable, timestamped price record for one instrument.
///
/// Construction enforces the persistence invariant: all three prices must
/// be positive and finite. The ticker client accepts zero-valued decimal
/// strings, so a quote can pass the client and still be rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub symbol: Symbol,
    pub last: f64,
    pub bid: f64,
    pub ask: f64,
    pub captured_at: UtcDateTime,
}

impl Observation {
    pub fn new(
        symbol: Symbol,
        last: f64,
        bid: f64,
        ask: f64,
        captured_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_positive("last", last)?;
        validate_positive("bid", bid)?;
        validate_positive("ask", ask)?;

        Ok(Self {
            symbol,
            last,
            bid,
            ask,
            captured_at,
        })
    }

    /// Absolute bid/ask spread.
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Spread as a percentage of the bid, rounded to two decimals.
    pub fn spread_percentage(&self) -> f64 {
        (self.spread() / self.bid * 100.0 * 100.0).round() / 100.0
    }
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btcaud() -> Symbol {
        Symbol::parse("BTCAUD").expect("valid symbol")
    }

    #[test]
    fn rejects_empty_instrument_name() {
        let err = Instrument::new(btcaud(), "  ").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyInstrumentName));
    }

    #[test]
    fn rejects_zero_price() {
        let now = UtcDateTime::now();
        let err = Observation::new(btcaud(), 0.0, 49_900.0, 50_100.0, now).expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::NonPositiveValue { field: "last", .. }
        ));
    }

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        let now = UtcDateTime::now();
        assert!(Observation::new(btcaud(), 50_000.0, -1.0, 50_100.0, now).is_err());
        assert!(Observation::new(btcaud(), 50_000.0, 49_900.0, f64::NAN, now).is_err());
    }

    #[test]
    fn computes_spread() {
        let now = UtcDateTime::now();
        let observation =
            Observation::new(btcaud(), 50_000.0, 49_900.0, 50_100.0, now).expect("valid");
        assert!((observation.spread() - 200.0).abs() < f64::EPSILON);
        assert!((observation.spread_percentage() - 0.4).abs() < 1e-9);
    }
}
