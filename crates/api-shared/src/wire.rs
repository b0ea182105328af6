//! Request and response shapes for the PRS HTTP API.
//!
//! Two read projections exist for patient records: [`PatientDetail`] carries
//! every stored field for detail views, [`PatientSummary`] is the trimmed
//! shape for list views. Both carry the computed `age`, which is derived from
//! the stored birth date at read time and never persisted.
//!
//! Dates cross the wire as strings: `date_of_birth` as `YYYY-MM-DD`,
//! timestamps as RFC 3339.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Full read projection of a patient record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientDetail {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub medical_history: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Whole years since `date_of_birth`, computed at read time.
    pub age: i32,
}

/// Trimmed read projection of a patient record, used by list views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientSummary {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub created_at: String,
    /// Whole years since `date_of_birth`, computed at read time.
    pub age: i32,
}

/// Write payload for creating or updating a patient record.
///
/// Every field is optional at the serialization layer so that missing or
/// invalid values can be reported per field rather than as one opaque
/// deserialization error. Creation requires the fields the data model marks
/// as mandatory; updates treat an absent field as "unchanged".
///
/// `patient_id`, `created_at` and `updated_at` are server-assigned and do not
/// appear here; supplying them in a request body has no effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PatientWrite {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub medical_history: Option<String>,
}

/// Per-field validation errors: field name to the list of messages for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the given field's error list.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns true when no field has errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Iterates over `(field, messages)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Success envelope for patient creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRes {
    pub message: String,
    pub data: PatientDetail,
}

/// Failure envelope for requests rejected by field validation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorRes {
    pub message: String,
    pub errors: FieldErrors,
}

/// Aggregate patient counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatsRes {
    pub total_patients: i64,
    pub male_patients: i64,
    pub female_patients: i64,
    pub other_patients: i64,
}

/// Public projection of an account. Never carries password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

/// Registration request body. `role` defaults to `patient` when absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Envelope for the authentication endpoints (login, logout, register,
/// profile).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPublic>,
    /// Dashboard path for the authenticated role; present on login only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthRes {
    /// Success envelope carrying a user projection.
    pub fn user(user: UserPublic) -> Self {
        Self {
            success: true,
            user: Some(user),
            redirect_to: None,
            error: None,
        }
    }

    /// Success envelope for login: user projection plus dashboard path.
    pub fn login(user: UserPublic, redirect_to: impl Into<String>) -> Self {
        Self {
            success: true,
            user: Some(user),
            redirect_to: Some(redirect_to.into()),
            error: None,
        }
    }

    /// Bare success envelope (logout).
    pub fn ok() -> Self {
        Self {
            success: true,
            user: None,
            redirect_to: None,
            error: None,
        }
    }

    /// Failure envelope with a single error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            redirect_to: None,
            error: Some(error.into()),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("phone_number", "Enter a valid phone number");
        errors.add("phone_number", "This field is required.");
        errors.add("gender", "Invalid gender");

        assert!(!errors.is_empty());
        assert_eq!(
            errors.get("phone_number").map(<[String]>::len),
            Some(2),
            "both phone messages should be kept"
        );
        assert_eq!(errors.get("gender").map(<[String]>::len), Some(1));
        assert!(errors.get("email").is_none());
    }

    #[test]
    fn test_field_errors_serialize_as_plain_map() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Enter a valid email address");

        let json = serde_json::to_value(&errors).expect("should serialize");
        assert_eq!(json["email"][0], "Enter a valid email address");
    }

    #[test]
    fn test_auth_res_failure_omits_user() {
        let json = serde_json::to_value(AuthRes::failure("Invalid username or password"))
            .expect("should serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid username or password");
        assert!(json.get("user").is_none(), "failure envelope must not carry a user");
    }

    #[test]
    fn test_auth_res_login_carries_redirect() {
        let user = UserPublic {
            id: 1,
            username: "drsmith".into(),
            email: "smith@clinic.example.org".into(),
            role: "doctor".into(),
            first_name: "Anna".into(),
            last_name: "Smith".into(),
        };
        let json = serde_json::to_value(AuthRes::login(user, "/doctor-dashboard"))
            .expect("should serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["redirect_to"], "/doctor-dashboard");
        assert_eq!(json["user"]["username"], "drsmith");
        assert!(
            json["user"].get("password").is_none() && json["user"].get("password_hash").is_none(),
            "public projection must not leak password material"
        );
    }

    #[test]
    fn test_patient_write_tolerates_missing_fields() {
        let write: PatientWrite =
            serde_json::from_str(r#"{"first_name": "Ada"}"#).expect("should deserialize");
        assert_eq!(write.first_name.as_deref(), Some("Ada"));
        assert!(write.last_name.is_none());
    }
}
