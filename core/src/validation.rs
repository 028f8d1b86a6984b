//! Field rules for the driver entry form.
//!
//! Every rule is a pure function from the raw input string to a typed value.
//! A failed rule stops the submission before any network I/O.

use serde::Serialize;
use thiserror::Error;

use crate::attachment::ImageAttachment;

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;
pub const PLATE_MIN_LENGTH: usize = 2;
pub const PLATE_MAX_LENGTH: usize = 10;
pub const MILEAGE_MAX: u32 = 999_999;
pub const TRIPS_MAX: u32 = 50;
pub const DELIVERIES_MAX: u32 = 999;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("name must be 2-50 characters, got {0}")]
    NameLength(usize),

    #[error("phone number must be 9-10 digits")]
    Phone,

    #[error("plate must be 2-10 characters, got {0}")]
    PlateLength(usize),

    #[error("{field} must be a number, got {raw:?}")]
    NotANumber { field: &'static str, raw: String },

    #[error("{field} must be a whole number, got {value}")]
    NotWhole { field: &'static str, value: f64 },

    #[error("{field} must be between 0 and {max}, got {value}")]
    OutOfRange { field: &'static str, value: f64, max: u32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("no image selected")]
    MissingImage,

    #[error("unsupported image type {0}, expected JPG, PNG or GIF")]
    UnsupportedImageType(String),

    #[error("image is {size} bytes, limit is {limit}")]
    ImageTooLarge { size: u64, limit: u64 },

    #[error("failed to read image: {0}")]
    ImageRead(String),
}

pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&len) {
        return Err(ValidationError::NameLength(len));
    }
    Ok(name.to_string())
}

pub fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let phone = raw.trim();
    let digits_only = phone.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || !(9..=10).contains(&phone.len()) {
        return Err(ValidationError::Phone);
    }
    Ok(phone.to_string())
}

pub fn validate_plate(raw: &str) -> Result<String, ValidationError> {
    let plate = raw.trim();
    let len = plate.chars().count();
    if !(PLATE_MIN_LENGTH..=PLATE_MAX_LENGTH).contains(&len) {
        return Err(ValidationError::PlateLength(len));
    }
    Ok(plate.to_string())
}

pub fn validate_mileage(raw: &str) -> Result<u32, ValidationError> {
    whole_in_range("mileage", raw, MILEAGE_MAX)
}

pub fn validate_trips(raw: &str) -> Result<u32, ValidationError> {
    whole_in_range("trips", raw, TRIPS_MAX)
}

pub fn validate_deliveries(raw: &str) -> Result<u32, ValidationError> {
    whole_in_range("deliveries", raw, DELIVERIES_MAX)
}

pub fn validate_income(raw: &str) -> Result<f64, ValidationError> {
    let value = number("income", raw)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field: "income", value });
    }
    Ok(value)
}

fn number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NotANumber {
            field,
            raw: trimmed.to_string(),
        }),
    }
}

fn whole_in_range(field: &'static str, raw: &str, max: u32) -> Result<u32, ValidationError> {
    let value = number(field, raw)?;
    if value < 0.0 || value > f64::from(max) {
        return Err(ValidationError::OutOfRange { field, value, max });
    }
    if value.fract() != 0.0 {
        return Err(ValidationError::NotWhole { field, value });
    }
    // In range and integral, so the cast is exact.
    Ok(value as u32)
}

/// Raw form input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct EntryForm {
    pub name: String,
    pub phone: String,
    pub plate: String,
    pub mileage: String,
    pub trips: String,
    pub deliveries: String,
    pub income: String,
    pub image: Option<ImageAttachment>,
}

/// A validated entry, serialized as the single argument of `submitEntry`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverEntry {
    pub name: String,
    pub phone: String,
    pub plate: String,
    pub mileage: u32,
    pub trips: u32,
    pub deliveries: u32,
    pub income: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl EntryForm {
    /// Validate every field in form order, stopping at the first failure.
    pub fn validate(&self) -> Result<DriverEntry, ValidationError> {
        Ok(DriverEntry {
            name: validate_name(&self.name)?,
            phone: validate_phone(&self.phone)?,
            plate: validate_plate(&self.plate)?,
            mileage: validate_mileage(&self.mileage)?,
            trips: validate_trips(&self.trips)?,
            deliveries: validate_deliveries(&self.deliveries)?,
            income: validate_income(&self.income)?,
            image_data: self.image.as_ref().map(ImageAttachment::to_data_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> EntryForm {
        EntryForm {
            name: "  Somchai  ".to_string(),
            phone: "0812345678".to_string(),
            plate: "1กข 1234".to_string(),
            mileage: "120500".to_string(),
            trips: "12".to_string(),
            deliveries: "87".to_string(),
            income: "1450.50".to_string(),
            image: None,
        }
    }

    #[test]
    fn valid_form_produces_trimmed_entry() {
        let entry = form().validate().unwrap();
        assert_eq!(entry.name, "Somchai");
        assert_eq!(entry.mileage, 120_500);
        assert_eq!(entry.trips, 12);
        assert_eq!(entry.deliveries, 87);
        assert_eq!(entry.income, 1450.5);
        assert!(entry.image_data.is_none());
    }

    #[test]
    fn entry_serializes_camel_case_without_absent_image() {
        let json = serde_json::to_value(form().validate().unwrap()).unwrap();
        assert_eq!(json["phone"], "0812345678");
        assert!(json.get("imageData").is_none());
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert!(validate_name("สม").is_ok());
        assert_eq!(validate_name(" a "), Err(ValidationError::NameLength(1)));
        assert_eq!(validate_name(&"x".repeat(51)), Err(ValidationError::NameLength(51)));
    }

    #[test]
    fn phone_requires_nine_or_ten_digits() {
        assert!(validate_phone("081234567").is_ok());
        assert!(validate_phone(" 0812345678 ").is_ok());
        assert_eq!(validate_phone("08123456"), Err(ValidationError::Phone));
        assert_eq!(validate_phone("08123456789"), Err(ValidationError::Phone));
        assert_eq!(validate_phone("081-234-567"), Err(ValidationError::Phone));
    }

    #[test]
    fn plate_bounds() {
        assert_eq!(validate_plate("A"), Err(ValidationError::PlateLength(1)));
        assert_eq!(validate_plate("ABCDEFGHIJK"), Err(ValidationError::PlateLength(11)));
    }

    #[test]
    fn counters_enforce_ranges() {
        assert_eq!(validate_trips("50"), Ok(50));
        assert!(matches!(validate_trips("51"), Err(ValidationError::OutOfRange { field: "trips", .. })));
        assert!(matches!(validate_mileage("-1"), Err(ValidationError::OutOfRange { .. })));
        assert!(matches!(validate_deliveries("2.5"), Err(ValidationError::NotWhole { .. })));
        assert!(matches!(validate_deliveries("lots"), Err(ValidationError::NotANumber { .. })));
        assert_eq!(validate_mileage("   "), Err(ValidationError::Missing("mileage")));
    }

    #[test]
    fn income_must_be_non_negative() {
        assert_eq!(validate_income("0"), Ok(0.0));
        assert!(matches!(validate_income("-5"), Err(ValidationError::Negative { .. })));
        assert!(matches!(validate_income("inf"), Err(ValidationError::NotANumber { .. })));
    }

    #[test]
    fn first_failing_field_wins() {
        let mut bad = form();
        bad.phone = "nope".to_string();
        bad.trips = "999".to_string();
        assert_eq!(bad.validate(), Err(ValidationError::Phone));
    }
}
