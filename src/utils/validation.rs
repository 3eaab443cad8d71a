use crate::utils::error::{AppError, Result};
use rust_decimal::Decimal;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Required text column with a maximum length, counted in characters.
pub fn validate_text_field(field_name: &str, value: &str, max_length: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError {
            field: field_name.to_string(),
            message: "This field may not be blank.".to_string(),
        });
    }

    let length = value.chars().count();
    if length > max_length {
        return Err(AppError::ValidationError {
            field: field_name.to_string(),
            message: format!(
                "Ensure this field has no more than {} characters (it has {}).",
                max_length, length
            ),
        });
    }
    Ok(())
}

/// Fixed-precision column check: at most `max_digits` digits in total, of which at
/// most `decimal_places` follow the point.
pub fn validate_decimal(
    field_name: &str,
    value: &Decimal,
    max_digits: u32,
    decimal_places: u32,
) -> Result<()> {
    let normalized = value.normalize();

    if normalized.scale() > decimal_places {
        return Err(AppError::ValidationError {
            field: field_name.to_string(),
            message: format!(
                "Ensure that there are no more than {} decimal places.",
                decimal_places
            ),
        });
    }

    let whole_digits = normalized
        .abs()
        .trunc()
        .to_string()
        .trim_start_matches('0')
        .len() as u32;
    let max_whole_digits = max_digits - decimal_places;
    if whole_digits > max_whole_digits {
        return Err(AppError::ValidationError {
            field: field_name.to_string(),
            message: format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_whole_digits
            ),
        });
    }

    Ok(())
}
