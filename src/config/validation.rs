// Field-level bound checks
// Each check appends to a shared violation list so one pass reports every bad field.

use std::fmt::Display;

use crate::error::ValidationError;

/// Joins a group prefix and a field name into a dotted path.
pub(crate) fn field_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Inclusive `[min, max]` check. NaN never passes.
pub(crate) fn check_range<T>(
    errors: &mut Vec<ValidationError>,
    prefix: &str,
    field: &str,
    value: T,
    min: T,
    max: T,
) where
    T: PartialOrd + Display + Copy,
{
    if !(value >= min && value <= max) {
        errors.push(ValidationError::new(
            field_path(prefix, field),
            format!("must be between {} and {} (got {})", min, max, value),
        ));
    }
}

/// Inclusive lower bound only.
pub(crate) fn check_min<T>(
    errors: &mut Vec<ValidationError>,
    prefix: &str,
    field: &str,
    value: T,
    min: T,
)
where
    T: PartialOrd + Display + Copy,
{
    if !(value >= min) {
        errors.push(ValidationError::new(
            field_path(prefix, field),
            format!("must be >= {} (got {})", min, value),
        ));
    }
}

/// `check_range` for optional fields; `None` always passes.
pub(crate) fn check_optional_range<T>(
    errors: &mut Vec<ValidationError>,
    prefix: &str,
    field: &str,
    value: Option<T>,
    min: T,
    max: T,
) where
    T: PartialOrd + Display + Copy,
{
    if let Some(v) = value {
        check_range(errors, prefix, field, v, min, max);
    }
}

pub(crate) fn check_optional_min<T>(
    errors: &mut Vec<ValidationError>,
    prefix: &str,
    field: &str,
    value: Option<T>,
    min: T,
) where
    T: PartialOrd + Display + Copy,
{
    if let Some(v) = value {
        check_min(errors, prefix, field, v, min);
    }
}
