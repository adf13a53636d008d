use std::num::NonZeroU32;
use std::time::Duration;

use crate::aggregate::Percentiles;
use crate::error::ValidationError;

/// Parse `<digits>[ms|s|m|h]`; a bare number means seconds.
///
/// # Errors
///
/// Returns an error for empty or malformed input, unknown units, overflow
/// and zero durations.
pub fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|source| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}

pub(super) fn parse_max_attempts(s: &str) -> Result<NonZeroU32, ValidationError> {
    let value: u32 = s
        .trim()
        .parse()
        .map_err(|source| ValidationError::InvalidNumber { source })?;
    NonZeroU32::new(value).ok_or(ValidationError::ValueTooSmall { min: 1 })
}

pub(super) fn parse_percentiles(s: &str) -> Result<Percentiles, ValidationError> {
    s.parse()
}
