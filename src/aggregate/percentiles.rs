use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Percentile markers computed for every combined histogram by default.
pub const DEFAULT_PERCENTILES: [f64; 5] = [50.0, 75.0, 90.0, 99.0, 99.9];

/// Validated, non-empty list of percentiles in `(0, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Percentiles(Vec<f64>);

impl Percentiles {
    /// # Errors
    ///
    /// Returns an error when the list is empty or a value is outside
    /// `(0, 100]`.
    pub fn new(values: Vec<f64>) -> Result<Self, ValidationError> {
        if values.is_empty() {
            return Err(ValidationError::PercentilesEmpty);
        }
        if let Some(value) = values
            .iter()
            .find(|value| !(value.is_finite() && **value > 0.0 && **value <= 100.0))
        {
            return Err(ValidationError::PercentileOutOfRange { value: *value });
        }
        Ok(Self(values))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Default for Percentiles {
    fn default() -> Self {
        Self(DEFAULT_PERCENTILES.to_vec())
    }
}

impl FromStr for Percentiles {
    type Err = ValidationError;

    /// Parse a comma separated list such as `50,90,99.9`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let values = value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .map_err(|source| ValidationError::InvalidPercentileNumber {
                        value: part.to_owned(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(values)
    }
}

impl fmt::Display for Percentiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, value) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
