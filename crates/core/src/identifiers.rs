//! Patient identifier generation.
//!
//! Identifiers have the shape `PAT<year><seq>` where `<seq>` is a decimal
//! sequence number scoped to the calendar year, zero-padded to 4 digits.
//! Sequence numbers above 9999 render wider and keep incrementing; the
//! candidate for "highest existing" is therefore selected by tail length
//! first and lexicographic order second, which equals numeric order for this
//! format.
//!
//! Allocation is not atomic on its own: callers must run [`next_in_year`] and
//! the subsequent insert inside one transaction and retry on a primary-key
//! conflict (see `repositories::patients`). The `patients.patient_id` primary
//! key is what ultimately guarantees that two concurrent creates never share
//! an identifier.

use rusqlite::{params, Connection, OptionalExtension};

use crate::constants::{PATIENT_ID_PREFIX, PATIENT_ID_SEQ_WIDTH};
use crate::error::PatientResult;

/// Renders a patient identifier for `year` and `sequence`.
pub fn format_patient_id(year: i32, sequence: u32) -> String {
    format!("{PATIENT_ID_PREFIX}{year}{sequence:0width$}", width = PATIENT_ID_SEQ_WIDTH)
}

/// Extracts the sequence number from `patient_id`, if it belongs to `year`.
///
/// The whole decimal tail is parsed, not just the last 4 characters, so
/// identifiers past sequence 9999 are read back correctly.
pub fn sequence_in_year(patient_id: &str, year: i32) -> Option<u32> {
    let prefix = format!("{PATIENT_ID_PREFIX}{year}");
    let tail = patient_id.strip_prefix(&prefix)?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Computes the next free identifier for `year` from the store.
///
/// Must be called inside the same transaction as the insert that uses the
/// returned identifier.
pub fn next_in_year(conn: &Connection, year: i32) -> PatientResult<String> {
    let prefix = format!("{PATIENT_ID_PREFIX}{year}");
    let pattern = format!("{prefix}%");

    let highest: Option<String> = conn
        .query_row(
            "SELECT patient_id FROM patients
             WHERE patient_id LIKE ?1
             ORDER BY LENGTH(patient_id) DESC, patient_id DESC
             LIMIT 1",
            params![pattern],
            |row| row.get(0),
        )
        .optional()?;

    let next_sequence = highest
        .as_deref()
        .and_then(|id| sequence_in_year(id, year))
        .map_or(1, |seq| seq + 1);

    Ok(format_patient_id(year, next_sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_format_zero_pads_to_four_digits() {
        assert_eq!(format_patient_id(2024, 1), "PAT20240001");
        assert_eq!(format_patient_id(2024, 42), "PAT20240042");
        assert_eq!(format_patient_id(2024, 9999), "PAT20249999");
    }

    #[test]
    fn test_format_widens_past_9999() {
        assert_eq!(format_patient_id(2024, 10000), "PAT202410000");
    }

    #[test]
    fn test_sequence_parses_whole_tail() {
        assert_eq!(sequence_in_year("PAT20240001", 2024), Some(1));
        assert_eq!(sequence_in_year("PAT20249999", 2024), Some(9999));
        assert_eq!(sequence_in_year("PAT202410000", 2024), Some(10000));
    }

    #[test]
    fn test_sequence_rejects_other_years_and_junk() {
        assert_eq!(sequence_in_year("PAT20230001", 2024), None);
        assert_eq!(sequence_in_year("PAT2024", 2024), None);
        assert_eq!(sequence_in_year("PAT2024007a", 2024), None);
    }

    fn insert_bare(conn: &rusqlite::Connection, patient_id: &str) {
        conn.execute(
            "INSERT INTO patients (patient_id, first_name, last_name, date_of_birth, gender,
                                   phone_number, address, emergency_contact_name,
                                   emergency_contact_phone, created_at, updated_at)
             VALUES (?1, 'A', 'B', '1990-01-01', 'M', '123456789', 'addr', 'C',
                     '987654321', '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')",
            params![patient_id],
        )
        .expect("test insert should succeed");
    }

    #[test]
    fn test_next_in_empty_year_starts_at_one() {
        let db = Database::open_in_memory().expect("open should succeed");
        let conn = db.lock();
        assert_eq!(next_in_year(&conn, 2024).expect("should succeed"), "PAT20240001");
    }

    #[test]
    fn test_next_increments_highest_in_year() {
        let db = Database::open_in_memory().expect("open should succeed");
        let conn = db.lock();
        insert_bare(&conn, "PAT20240001");
        insert_bare(&conn, "PAT20240007");
        insert_bare(&conn, "PAT20230042");
        assert_eq!(next_in_year(&conn, 2024).expect("should succeed"), "PAT20240008");
    }

    #[test]
    fn test_next_is_scoped_per_year() {
        let db = Database::open_in_memory().expect("open should succeed");
        let conn = db.lock();
        insert_bare(&conn, "PAT20230042");
        assert_eq!(next_in_year(&conn, 2024).expect("should succeed"), "PAT20240001");
    }

    #[test]
    fn test_next_survives_width_overflow() {
        let db = Database::open_in_memory().expect("open should succeed");
        let conn = db.lock();
        insert_bare(&conn, "PAT20249999");
        insert_bare(&conn, "PAT202410000");
        assert_eq!(
            next_in_year(&conn, 2024).expect("should succeed"),
            "PAT202410001",
            "the numerically highest id should win over the lexicographic one"
        );
    }
}
