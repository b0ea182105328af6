//! # PRS Core
//!
//! Core business logic for the PRS patient record system.
//!
//! This crate contains pure data operations over the SQLite store:
//! - Patient CRUD, search and aggregate statistics
//! - Year-scoped patient identifier allocation
//! - Account registration and credential checks
//! - The in-memory session cache
//!
//! **No API concerns**: HTTP servers, response envelopes and cookie handling
//! belong in `api-rest`.

pub mod account;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod identifiers;
pub mod password;
pub mod patient;
pub mod repositories;
pub mod session;
pub mod validation;

pub use account::{dashboard_destination, Account, NewAccount, Role};
pub use config::{database_path_from_env_value, CoreConfig};
pub use db::Database;
pub use error::{PatientError, PatientResult};
pub use patient::{age_on, BloodType, Gender, Patient};
pub use repositories::accounts::AccountService;
pub use repositories::patients::PatientService;
pub use session::{shared_session_cache, SessionCache, SharedSessionCache};

// Validated text types shared with the API layer.
pub use prs_types::{EmailAddress, NonEmptyText, PhoneNumber, TextError};
