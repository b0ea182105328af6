//! Constants used throughout the PRS core crate.
//!
//! This module contains identifier-format and filename constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Prefix of every patient identifier.
pub const PATIENT_ID_PREFIX: &str = "PAT";

/// Minimum width of the zero-padded sequence portion of a patient identifier.
///
/// Sequence numbers above 9999 render wider; the width is a floor, not a cap.
pub const PATIENT_ID_SEQ_WIDTH: usize = 4;

/// Attempts made to allocate a fresh patient identifier before giving up.
///
/// A retry is only consumed when a concurrent writer wins the race for the
/// same identifier and the insert hits the primary-key constraint.
pub const MAX_ID_ALLOCATION_ATTEMPTS: usize = 5;

/// Default database file when no explicit path is configured.
pub const DEFAULT_DATABASE_FILE: &str = "patient_records.db";

/// Name of the session cookie issued on login.
pub const SESSION_COOKIE_NAME: &str = "sessionid";
