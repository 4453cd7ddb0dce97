//! Price adjustment from the gap between projected and actual performance.

use crate::domain::error::SportstockError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SENSITIVITY: f64 = 0.1;
pub const DEFAULT_MIN_PRICE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingEngine {
    /// Fraction of the relative score delta passed through to the price.
    pub sensitivity: f64,
    pub min_price: f64,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            min_price: DEFAULT_MIN_PRICE,
        }
    }
}

impl PricingEngine {
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity,
            ..Self::default()
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SportstockError> {
        let sensitivity = config.get_double("pricing", "sensitivity", DEFAULT_SENSITIVITY);
        if !sensitivity.is_finite() || sensitivity <= 0.0 {
            return Err(SportstockError::ConfigInvalid {
                section: "pricing".into(),
                key: "sensitivity".into(),
                reason: "sensitivity must be a positive number".into(),
            });
        }
        let min_price = config.get_double("pricing", "min_price", DEFAULT_MIN_PRICE);
        if !min_price.is_finite() || min_price <= 0.0 {
            return Err(SportstockError::ConfigInvalid {
                section: "pricing".into(),
                key: "min_price".into(),
                reason: "min_price must be a positive number".into(),
            });
        }
        Ok(Self {
            sensitivity,
            min_price,
        })
    }

    /// Move `current_price` by `sensitivity` times the relative score delta,
    /// floored at `min_price` and rounded to cents.
    ///
    /// A zero projection leaves the price untouched, as does any input that
    /// would produce a non-finite price.
    pub fn calculate_new_price(
        &self,
        current_price: f64,
        projected_score: f64,
        actual_score: f64,
    ) -> f64 {
        if projected_score == 0.0 {
            return current_price;
        }

        let delta_percent = (actual_score - projected_score) / projected_score;
        let price_change_percent = delta_percent * self.sensitivity;
        let new_price = current_price * (1.0 + price_change_percent);
        if !new_price.is_finite() {
            return current_price;
        }

        round_cents(new_price.max(self.min_price))
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
