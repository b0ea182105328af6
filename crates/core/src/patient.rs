//! Patient record model and read projections.
//!
//! A [`Patient`] is the stored form of one record. The wire projections
//! ([`PatientDetail`], [`PatientSummary`]) are produced here because they
//! carry the computed `age` field, which is a pure function of the stored
//! birth date and the current date and is never persisted.

use api_shared::wire::{PatientDetail, PatientSummary};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Patient gender, stored as the single letters `M`, `F`, `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "O" => Ok(Gender::Other),
            _ => Err(()),
        }
    }
}

/// One of the 8 standard blood types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodType {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

impl BloodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl std::str::FromStr for BloodType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A+" => Ok(BloodType::APositive),
            "A-" => Ok(BloodType::ANegative),
            "B+" => Ok(BloodType::BPositive),
            "B-" => Ok(BloodType::BNegative),
            "AB+" => Ok(BloodType::AbPositive),
            "AB-" => Ok(BloodType::AbNegative),
            "O+" => Ok(BloodType::OPositive),
            "O-" => Ok(BloodType::ONegative),
            _ => Err(()),
        }
    }
}

/// A stored patient record.
///
/// `patient_id` is assigned exactly once at creation and never recomputed;
/// `created_at` and `updated_at` are maintained by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub patient_id: String,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        age_on(self.date_of_birth, today)
    }

    /// Full read projection, with `age` computed for `today`.
    pub fn to_detail(&self, today: NaiveDate) -> PatientDetail {
        PatientDetail {
            patient_id: self.patient_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth.to_string(),
            gender: self.gender.as_str().to_string(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            emergency_contact_name: self.emergency_contact_name.clone(),
            emergency_contact_phone: self.emergency_contact_phone.clone(),
            blood_type: self.blood_type.map(|b| b.as_str().to_string()),
            allergies: self.allergies.clone(),
            medical_history: self.medical_history.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
            age: self.age_on(today),
        }
    }

    /// Summary read projection for list views, with `age` computed for
    /// `today`.
    pub fn to_summary(&self, today: NaiveDate) -> PatientSummary {
        PatientSummary {
            patient_id: self.patient_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth.to_string(),
            gender: self.gender.as_str().to_string(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            created_at: self.created_at.to_rfc3339(),
            age: self.age_on(today),
        }
    }
}

/// Whole years between `date_of_birth` and `today`.
///
/// The year difference is decremented by one when `today`'s (month, day)
/// falls before the birth (month, day) — the birthday has not occurred yet
/// this year.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}
