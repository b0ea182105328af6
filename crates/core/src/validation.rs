//! Field validation for patient write payloads.
//!
//! Failures are collected per field into a [`FieldErrors`] map rather than
//! reported as a single opaque error, so a response can name every problem at
//! once. Creation requires the mandatory fields; updates treat an absent
//! field as "unchanged" but still validate every field that is present.

use api_shared::wire::{FieldErrors, PatientWrite};
use chrono::NaiveDate;
use prs_types::{EmailAddress, NonEmptyText, PhoneNumber};

use crate::patient::{BloodType, Gender};

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const INVALID_DATE: &str = "Enter a valid date (YYYY-MM-DD).";

/// A fully validated create payload, with typed fields ready for insertion.
#[derive(Debug, Clone)]
pub struct NewPatientRecord {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
    pub medical_history: Option<String>,
}

/// A validated partial update: `None` means "leave unchanged".
///
/// Optional stored fields (`email`, `blood_type`, `allergies`,
/// `medical_history`) are cleared by supplying an empty string.
#[derive(Debug, Clone, Default)]
pub struct PatientChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone_number: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub blood_type: Option<Option<BloodType>>,
    pub allergies: Option<Option<String>>,
    pub medical_history: Option<Option<String>>,
}

fn invalid_choice(value: &str) -> String {
    format!("\"{value}\" is not a valid choice.")
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&String>,
    missing_message: &str,
) -> Option<String> {
    match value {
        None => {
            errors.add(field, missing_message);
            None
        }
        Some(raw) => match NonEmptyText::new(raw) {
            Ok(text) => Some(text.into_string()),
            Err(_) => {
                errors.add(field, BLANK);
                None
            }
        },
    }
}

fn parse_phone(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<String> {
    match PhoneNumber::parse(raw) {
        Ok(phone) => Some(phone.as_str().to_string()),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

fn parse_date(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<NaiveDate> {
    match raw.trim().parse::<NaiveDate>() {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, INVALID_DATE);
            None
        }
    }
}

fn parse_gender(errors: &mut FieldErrors, raw: &str) -> Option<Gender> {
    match raw.trim().parse::<Gender>() {
        Ok(gender) => Some(gender),
        Err(()) => {
            errors.add("gender", invalid_choice(raw.trim()));
            None
        }
    }
}

/// Empty optional text is stored as NULL, not as an empty string.
fn optional_text(value: Option<&String>) -> Option<Option<String>> {
    value.map(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_optional_email(errors: &mut FieldErrors, value: Option<&String>) -> Option<Option<String>> {
    optional_text(value).map(|email| match email {
        None => None,
        Some(raw) => match EmailAddress::parse(&raw) {
            Ok(address) => Some(address.as_str().to_string()),
            Err(e) => {
                errors.add("email", e.to_string());
                None
            }
        },
    })
}

fn parse_optional_blood_type(
    errors: &mut FieldErrors,
    value: Option<&String>,
) -> Option<Option<BloodType>> {
    optional_text(value).map(|blood| match blood {
        None => None,
        Some(raw) => match raw.parse::<BloodType>() {
            Ok(blood_type) => Some(blood_type),
            Err(()) => {
                errors.add("blood_type", invalid_choice(&raw));
                None
            }
        },
    })
}

/// Validates a create payload.
///
/// # Errors
///
/// Returns the complete per-field error map when any field is missing,
/// blank, malformed or not a valid choice.
pub fn validate_new_patient(input: &PatientWrite) -> Result<NewPatientRecord, FieldErrors> {
    let mut errors = FieldErrors::new();

    let first_name = required_text(&mut errors, "first_name", input.first_name.as_ref(), REQUIRED);
    let last_name = required_text(&mut errors, "last_name", input.last_name.as_ref(), REQUIRED);
    let address = required_text(&mut errors, "address", input.address.as_ref(), REQUIRED);
    let emergency_contact_name = required_text(
        &mut errors,
        "emergency_contact_name",
        input.emergency_contact_name.as_ref(),
        REQUIRED,
    );

    let date_of_birth = match input.date_of_birth.as_deref() {
        None => {
            errors.add("date_of_birth", REQUIRED);
            None
        }
        Some(raw) => parse_date(&mut errors, "date_of_birth", raw),
    };

    let gender = match input.gender.as_deref() {
        None => {
            errors.add("gender", REQUIRED);
            None
        }
        Some(raw) => parse_gender(&mut errors, raw),
    };

    let phone_number = match input.phone_number.as_deref() {
        None => {
            errors.add("phone_number", REQUIRED);
            None
        }
        Some(raw) => parse_phone(&mut errors, "phone_number", raw),
    };

    let emergency_contact_phone = match input.emergency_contact_phone.as_deref() {
        None => {
            errors.add("emergency_contact_phone", REQUIRED);
            None
        }
        Some(raw) => parse_phone(&mut errors, "emergency_contact_phone", raw),
    };

    let email = parse_optional_email(&mut errors, input.email.as_ref()).unwrap_or(None);
    let blood_type =
        parse_optional_blood_type(&mut errors, input.blood_type.as_ref()).unwrap_or(None);
    let allergies = optional_text(input.allergies.as_ref()).unwrap_or(None);
    let medical_history = optional_text(input.medical_history.as_ref()).unwrap_or(None);

    if !errors.is_empty() {
        return Err(errors);
    }

    // All `Some` past this point: every `None` above recorded an error.
    match (
        first_name,
        last_name,
        address,
        emergency_contact_name,
        date_of_birth,
        gender,
        phone_number,
        emergency_contact_phone,
    ) {
        (
            Some(first_name),
            Some(last_name),
            Some(address),
            Some(emergency_contact_name),
            Some(date_of_birth),
            Some(gender),
            Some(phone_number),
            Some(emergency_contact_phone),
        ) => Ok(NewPatientRecord {
            first_name,
            last_name,
            date_of_birth,
            gender,
            phone_number,
            email,
            address,
            emergency_contact_name,
            emergency_contact_phone,
            blood_type,
            allergies,
            medical_history,
        }),
        _ => Err(errors),
    }
}

/// Validates an update payload; absent fields stay unchanged.
///
/// # Errors
///
/// Returns the per-field error map when any supplied field is blank,
/// malformed or not a valid choice.
pub fn validate_changes(input: &PatientWrite) -> Result<PatientChanges, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut changes = PatientChanges::default();

    if input.first_name.is_some() {
        changes.first_name = required_text(&mut errors, "first_name", input.first_name.as_ref(), BLANK);
    }
    if input.last_name.is_some() {
        changes.last_name = required_text(&mut errors, "last_name", input.last_name.as_ref(), BLANK);
    }
    if input.address.is_some() {
        changes.address = required_text(&mut errors, "address", input.address.as_ref(), BLANK);
    }
    if input.emergency_contact_name.is_some() {
        changes.emergency_contact_name = required_text(
            &mut errors,
            "emergency_contact_name",
            input.emergency_contact_name.as_ref(),
            BLANK,
        );
    }
    if let Some(raw) = input.date_of_birth.as_deref() {
        changes.date_of_birth = parse_date(&mut errors, "date_of_birth", raw);
    }
    if let Some(raw) = input.gender.as_deref() {
        changes.gender = parse_gender(&mut errors, raw);
    }
    if let Some(raw) = input.phone_number.as_deref() {
        changes.phone_number = parse_phone(&mut errors, "phone_number", raw);
    }
    if let Some(raw) = input.emergency_contact_phone.as_deref() {
        changes.emergency_contact_phone = parse_phone(&mut errors, "emergency_contact_phone", raw);
    }

    changes.email = parse_optional_email(&mut errors, input.email.as_ref());
    changes.blood_type = parse_optional_blood_type(&mut errors, input.blood_type.as_ref());
    changes.allergies = optional_text(input.allergies.as_ref());
    changes.medical_history = optional_text(input.medical_history.as_ref());

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}
