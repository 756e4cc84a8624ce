//! Booking input validation and pricing rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Valid day-of-week range for schedule templates (Mon-Fri).
pub const TEMPLATE_DAY_RANGE: std::ops::RangeInclusive<i16> = 1..=5;

/// Default capacity applied when a template is created without one.
pub const DEFAULT_TEMPLATE_CAPACITY: i32 = 10;

/// A child as embedded in a booking request and in the record detail
/// snapshot. The (name, age, gender) tuple is the child's identity for
/// the per-slot duplicate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kid {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// Reject template days outside Mon-Fri. Weekend slots can only ever
/// be created manually.
pub fn validate_template_day(day_of_week: i16) -> Result<(), CoreError> {
    if TEMPLATE_DAY_RANGE.contains(&day_of_week) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "day_of_week must be 1-5 (Mon-Fri)".to_string(),
        ))
    }
}

/// Validate a booking's kid roster against the declared head count.
pub fn validate_kid_roster(number_of_kids: i32, kids: &[Kid]) -> Result<(), CoreError> {
    if number_of_kids < 1 {
        return Err(CoreError::Validation(
            "number_of_kids must be at least 1".to_string(),
        ));
    }
    if kids.len() != number_of_kids as usize {
        return Err(CoreError::Validation(format!(
            "expected {number_of_kids} kids, got {}",
            kids.len()
        )));
    }
    for kid in kids {
        if kid.name.trim().is_empty() {
            return Err(CoreError::Validation("every kid needs a name".to_string()));
        }
        if kid.age < 0 {
            return Err(CoreError::Validation(format!(
                "invalid age for kid '{}'",
                kid.name
            )));
        }
    }
    Ok(())
}

/// Total price of a direct booking: activity price times head count.
pub fn booking_price(activity_price: i32, number_of_kids: i32) -> i32 {
    activity_price * number_of_kids
}

/// Price attributed to one auto-enrolled visit: the subscription's
/// paid price spread evenly over its granted visits.
pub fn per_visit_price(price_paid: i32, visits_total: i32) -> i32 {
    if visits_total <= 0 {
        return 0;
    }
    price_paid / visits_total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kid(name: &str) -> Kid {
        Kid {
            name: name.to_string(),
            age: 7,
            gender: "f".to_string(),
        }
    }

    #[test]
    fn template_day_range() {
        assert!(validate_template_day(1).is_ok());
        assert!(validate_template_day(5).is_ok());
        assert!(validate_template_day(0).is_err());
        assert!(validate_template_day(6).is_err());
        assert!(validate_template_day(7).is_err());
    }

    #[test]
    fn roster_must_match_head_count() {
        assert!(validate_kid_roster(1, &[kid("Ann")]).is_ok());
        assert!(validate_kid_roster(2, &[kid("Ann")]).is_err());
        assert!(validate_kid_roster(0, &[]).is_err());
    }

    #[test]
    fn roster_rejects_blank_names() {
        assert!(validate_kid_roster(1, &[kid("  ")]).is_err());
    }

    #[test]
    fn pricing() {
        assert_eq!(booking_price(250, 3), 750);
        assert_eq!(per_visit_price(1000, 4), 250);
        assert_eq!(per_visit_price(1000, 0), 0);
    }
}
