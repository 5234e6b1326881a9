//! OKR template rules: names, weights and rating-band defaults.

use crate::error::CoreError;

pub const MAX_TEMPLATE_NAME_LENGTH: usize = 200;

pub const MAX_WEIGHT: f64 = 100.0;

/// Rating-band text used when a template key result leaves a band empty.
///
/// Index 0 describes a rating of 1, index 4 a rating of 5.
pub const DEFAULT_RATING_BANDS: [&str; 5] = [
    "Needs Improvement",
    "Below Expectations",
    "Meets Expectations",
    "Exceeds Expectations",
    "Outstanding",
];

pub fn validate_template_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Template name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_TEMPLATE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Template name exceeds maximum length of {MAX_TEMPLATE_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Weights are percentages in `0..=100`.
pub fn validate_weight(weight: f64) -> Result<(), CoreError> {
    if !weight.is_finite() || !(0.0..=MAX_WEIGHT).contains(&weight) {
        return Err(CoreError::Validation(format!(
            "Weight {weight} is out of range. Must be between 0 and {MAX_WEIGHT}"
        )));
    }
    Ok(())
}

/// Fill empty rating bands with the defaults, keeping any provided text.
pub fn rating_bands_or_default(bands: [&str; 5]) -> [String; 5] {
    std::array::from_fn(|i| {
        let band = bands[i].trim();
        if band.is_empty() {
            DEFAULT_RATING_BANDS[i].to_string()
        } else {
            band.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn blank_name_rejected() {
        assert_matches!(validate_template_name("  "), Err(CoreError::Validation(_)));
        assert!(validate_template_name("Consultant OKR Template").is_ok());
    }

    #[test]
    fn weight_bounds() {
        assert!(validate_weight(0.0).is_ok());
        assert!(validate_weight(100.0).is_ok());
        assert_matches!(validate_weight(-1.0), Err(CoreError::Validation(_)));
        assert_matches!(validate_weight(100.5), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_bands_take_defaults() {
        let bands = rating_bands_or_default(["Poor", "", " ", "Great", ""]);
        assert_eq!(bands[0], "Poor");
        assert_eq!(bands[1], "Below Expectations");
        assert_eq!(bands[2], "Meets Expectations");
        assert_eq!(bands[3], "Great");
        assert_eq!(bands[4], "Outstanding");
    }
}
