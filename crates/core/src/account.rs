//! Login accounts and roles.

use api_shared::wire::UserPublic;
use chrono::{DateTime, Utc};

/// Account role. The set is closed; an `admin` role shows up in older
/// operator tooling but is not part of the account model (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Doctor,
    Nurse,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Patient => "patient",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Role::Doctor),
            "nurse" => Ok(Role::Nurse),
            "patient" => Ok(Role::Patient),
            _ => Err(()),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Patient
    }
}

/// Maps a role name to the dashboard path a client should land on after
/// login. Unknown names fall through to the generic home page.
pub fn dashboard_destination(role: &str) -> &'static str {
    match role {
        "doctor" => "/doctor-dashboard",
        "nurse" => "/nurse-dashboard",
        "patient" => "/patient-dashboard",
        _ => "/home",
    }
}

/// A stored login account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Public projection of this account. Carries no password material.
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.as_str().to_string(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Input for account registration.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips() {
        for (variant, s) in [
            (Role::Doctor, "doctor"),
            (Role::Nurse, "nurse"),
            (Role::Patient, "patient"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(s.parse::<Role>().expect("should parse"), variant);
        }
        assert!("admin".parse::<Role>().is_err(), "admin is not a modeled role");
    }

    #[test]
    fn test_dashboard_dispatch_covers_roles_and_defaults() {
        assert_eq!(dashboard_destination("doctor"), "/doctor-dashboard");
        assert_eq!(dashboard_destination("nurse"), "/nurse-dashboard");
        assert_eq!(dashboard_destination("patient"), "/patient-dashboard");
        assert_eq!(dashboard_destination("admin"), "/home");
        assert_eq!(dashboard_destination(""), "/home");
    }

    #[test]
    fn test_public_projection_has_no_password_material() {
        let account = Account {
            id: 7,
            username: "npatel".into(),
            password_hash: "$pbkdf2-sha256$...".into(),
            email: "n@clinic.example.org".into(),
            first_name: "Nisha".into(),
            last_name: "Patel".into(),
            role: Role::Nurse,
            created_at: Utc::now(),
        };
        let public = account.to_public();
        assert_eq!(public.role, "nurse");

        let json = serde_json::to_string(&public).expect("should serialize");
        assert!(!json.contains("pbkdf2"), "projection must not leak the hash");
    }
}
