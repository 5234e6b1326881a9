//! Rating rules shared by the employee, manager and final rating slots.

use crate::error::CoreError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Validate a per-key-result rating (1 to 5 inclusive).
pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating {rating} is out of range. Must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

/// Validate the review-level overall rating, which may be fractional.
pub fn validate_overall_rating(rating: f64) -> Result<(), CoreError> {
    if !rating.is_finite() || rating < f64::from(MIN_RATING) || rating > f64::from(MAX_RATING) {
        return Err(CoreError::Validation(format!(
            "Overall rating {rating} is out of range. Must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

/// Count the manager ratings still missing.
pub fn count_unrated<I>(manager_ratings: I) -> usize
where
    I: IntoIterator<Item = Option<i16>>,
{
    manager_ratings.into_iter().filter(Option::is_none).count()
}

/// Gate finalization on every key result carrying a manager rating.
pub fn ensure_fully_rated<I>(manager_ratings: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = Option<i16>>,
{
    match count_unrated(manager_ratings) {
        0 => Ok(()),
        n => Err(CoreError::Validation(format!(
            "Cannot finalize review. Please rate all {n} key result(s) before finalizing."
        ))),
    }
}
