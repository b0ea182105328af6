//! Patient record storage operations.
//!
//! This module provides the service for patient CRUD, search and aggregate
//! statistics. Identifier assignment and the insert run inside one immediate
//! transaction; a primary-key conflict (a concurrent writer allocated the
//! same identifier first) rolls the transaction back and retries with a
//! freshly computed identifier, bounded by
//! [`MAX_ID_ALLOCATION_ATTEMPTS`](crate::constants::MAX_ID_ALLOCATION_ATTEMPTS).
//!
//! ## Pure Data Operations
//!
//! This module contains **only** data operations — no API concerns such as
//! authentication, HTTP servers, or response envelopes. API-level logic
//! belongs in `api-rest`.

use api_shared::wire::{PatientWrite, StatsRes};
use chrono::{Datelike, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::constants::MAX_ID_ALLOCATION_ATTEMPTS;
use crate::db::Database;
use crate::error::{PatientError, PatientResult};
use crate::identifiers;
use crate::patient::{BloodType, Gender, Patient};
use crate::validation::{self, PatientChanges};

const PATIENT_COLUMNS: &str = "patient_id, first_name, last_name, date_of_birth, gender, \
     phone_number, email, address, emergency_contact_name, emergency_contact_phone, \
     blood_type, allergies, medical_history, created_at, updated_at";

/// Service for patient record operations.
#[derive(Clone)]
pub struct PatientService {
    db: Database,
}

impl PatientService {
    /// Creates a new service over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validates `input`, assigns a fresh patient identifier and persists the
    /// record.
    ///
    /// Nothing is persisted when validation fails; the error carries the
    /// complete per-field map.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` on bad input,
    /// `PatientError::IdAllocationExhausted` when every identifier attempt
    /// lost its race, or a database error.
    pub fn create(&self, input: &PatientWrite) -> PatientResult<Patient> {
        let record = validation::validate_new_patient(input).map_err(PatientError::Validation)?;

        let mut conn = self.db.lock();
        for _ in 0..MAX_ID_ALLOCATION_ATTEMPTS {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let now = Utc::now();
            let year = now.date_naive().year();
            let patient_id = identifiers::next_in_year(&tx, year)?;

            let inserted = tx.execute(
                "INSERT INTO patients (patient_id, first_name, last_name, date_of_birth, gender,
                                       phone_number, email, address, emergency_contact_name,
                                       emergency_contact_phone, blood_type, allergies,
                                       medical_history, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    patient_id,
                    record.first_name,
                    record.last_name,
                    record.date_of_birth,
                    record.gender.as_str(),
                    record.phone_number,
                    record.email,
                    record.address,
                    record.emergency_contact_name,
                    record.emergency_contact_phone,
                    record.blood_type.map(|b| b.as_str()),
                    record.allergies,
                    record.medical_history,
                    now,
                    now,
                ],
            );

            match inserted {
                Ok(_) => {
                    tx.commit()?;
                    return Ok(Patient {
                        patient_id,
                        first_name: record.first_name,
                        last_name: record.last_name,
                        date_of_birth: record.date_of_birth,
                        gender: record.gender,
                        phone_number: record.phone_number,
                        email: record.email,
                        address: record.address,
                        emergency_contact_name: record.emergency_contact_name,
                        emergency_contact_phone: record.emergency_contact_phone,
                        blood_type: record.blood_type,
                        allergies: record.allergies,
                        medical_history: record.medical_history,
                        created_at: now,
                        updated_at: now,
                    });
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!("patient id {patient_id} lost an allocation race, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PatientError::IdAllocationExhausted)
    }

    /// Fetches a record by its patient identifier.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::PatientNotFound` for an unknown identifier.
    pub fn get(&self, patient_id: &str) -> PatientResult<Patient> {
        let conn = self.db.lock();
        get_by_id(&conn, patient_id)
    }

    /// Applies a partial update and bumps `updated_at`.
    ///
    /// Absent fields are left unchanged; supplied fields are validated before
    /// anything is written.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` on bad input or
    /// `PatientError::PatientNotFound` for an unknown identifier.
    pub fn update(&self, patient_id: &str, input: &PatientWrite) -> PatientResult<Patient> {
        let changes = validation::validate_changes(input).map_err(PatientError::Validation)?;

        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let mut patient = get_by_id(&tx, patient_id)?;
        apply_changes(&mut patient, changes);
        patient.updated_at = Utc::now();

        tx.execute(
            "UPDATE patients SET first_name = ?2, last_name = ?3, date_of_birth = ?4,
                                 gender = ?5, phone_number = ?6, email = ?7, address = ?8,
                                 emergency_contact_name = ?9, emergency_contact_phone = ?10,
                                 blood_type = ?11, allergies = ?12, medical_history = ?13,
                                 updated_at = ?14
             WHERE patient_id = ?1",
            params![
                patient.patient_id,
                patient.first_name,
                patient.last_name,
                patient.date_of_birth,
                patient.gender.as_str(),
                patient.phone_number,
                patient.email,
                patient.address,
                patient.emergency_contact_name,
                patient.emergency_contact_phone,
                patient.blood_type.map(|b| b.as_str()),
                patient.allergies,
                patient.medical_history,
                patient.updated_at,
            ],
        )?;
        tx.commit()?;

        Ok(patient)
    }

    /// Hard-deletes a record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::PatientNotFound` for an unknown identifier.
    pub fn delete(&self, patient_id: &str) -> PatientResult<()> {
        let conn = self.db.lock();
        let affected = conn.execute(
            "DELETE FROM patients WHERE patient_id = ?1",
            params![patient_id],
        )?;
        if affected == 0 {
            return Err(PatientError::PatientNotFound(patient_id.to_string()));
        }
        Ok(())
    }

    /// Lists patients, most recently created first.
    ///
    /// With a non-empty `search`, only records whose first name, last name,
    /// patient identifier or phone number contains the term
    /// (case-insensitively) are returned.
    pub fn list(&self, search: Option<&str>) -> PatientResult<Vec<Patient>> {
        let conn = self.db.lock();

        match search.filter(|term| !term.is_empty()) {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(term));
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PATIENT_COLUMNS} FROM patients
                     WHERE first_name LIKE ?1 ESCAPE '\\'
                        OR last_name LIKE ?1 ESCAPE '\\'
                        OR patient_id LIKE ?1 ESCAPE '\\'
                        OR phone_number LIKE ?1 ESCAPE '\\'
                     ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map(params![pattern], patient_from_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map([], patient_from_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
        }
    }

    /// Total patient count and per-gender counts.
    pub fn stats(&self) -> PatientResult<StatsRes> {
        let conn = self.db.lock();
        let stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN gender = 'M' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN gender = 'F' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN gender = 'O' THEN 1 ELSE 0 END), 0)
             FROM patients",
            [],
            |row| {
                Ok(StatsRes {
                    total_patients: row.get(0)?,
                    male_patients: row.get(1)?,
                    female_patients: row.get(2)?,
                    other_patients: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }
}

fn get_by_id(conn: &Connection, patient_id: &str) -> PatientResult<Patient> {
    conn.query_row(
        &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?1"),
        params![patient_id],
        patient_from_row,
    )
    .optional()?
    .ok_or_else(|| PatientError::PatientNotFound(patient_id.to_string()))
}

fn apply_changes(patient: &mut Patient, changes: PatientChanges) {
    if let Some(v) = changes.first_name {
        patient.first_name = v;
    }
    if let Some(v) = changes.last_name {
        patient.last_name = v;
    }
    if let Some(v) = changes.date_of_birth {
        patient.date_of_birth = v;
    }
    if let Some(v) = changes.gender {
        patient.gender = v;
    }
    if let Some(v) = changes.phone_number {
        patient.phone_number = v;
    }
    if let Some(v) = changes.email {
        patient.email = v;
    }
    if let Some(v) = changes.address {
        patient.address = v;
    }
    if let Some(v) = changes.emergency_contact_name {
        patient.emergency_contact_name = v;
    }
    if let Some(v) = changes.emergency_contact_phone {
        patient.emergency_contact_phone = v;
    }
    if let Some(v) = changes.blood_type {
        patient.blood_type = v;
    }
    if let Some(v) = changes.allergies {
        patient.allergies = v;
    }
    if let Some(v) = changes.medical_history {
        patient.medical_history = v;
    }
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    let gender: String = row.get(4)?;
    let gender = gender.parse::<Gender>().map_err(|()| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("invalid gender {gender:?}").into(),
        )
    })?;

    let blood_type: Option<String> = row.get(10)?;
    let blood_type = blood_type
        .map(|raw| {
            raw.parse::<BloodType>().map_err(|()| {
                rusqlite::Error::FromSqlConversionFailure(
                    10,
                    rusqlite::types::Type::Text,
                    format!("invalid blood type {raw:?}").into(),
                )
            })
        })
        .transpose()?;

    Ok(Patient {
        patient_id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        date_of_birth: row.get(3)?,
        gender,
        phone_number: row.get(5)?,
        email: row.get(6)?,
        address: row.get(7)?,
        emergency_contact_name: row.get(8)?,
        emergency_contact_phone: row.get(9)?,
        blood_type,
        allergies: row.get(11)?,
        medical_history: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Escapes LIKE metacharacters so a search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::wire::PatientWrite;

    fn service() -> PatientService {
        PatientService::new(Database::open_in_memory().expect("open should succeed"))
    }

    fn write(first: &str, last: &str, gender: &str) -> PatientWrite {
        PatientWrite {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            date_of_birth: Some("1990-05-20".into()),
            gender: Some(gender.into()),
            phone_number: Some("+15551234567".into()),
            email: Some(format!("{}@example.org", first.to_lowercase())),
            address: Some("12 Harbour Row".into()),
            emergency_contact_name: Some("Next Of Kin".into()),
            emergency_contact_phone: Some("+15557654321".into()),
            blood_type: Some("O+".into()),
            allergies: None,
            medical_history: None,
        }
    }

    #[test]
    fn test_create_then_retrieve_round_trips() {
        let service = service();
        let created = service.create(&write("June", "Osei", "F")).expect("create should succeed");

        let year = Utc::now().date_naive().year();
        assert_eq!(created.patient_id, format!("PAT{year}0001"));

        let fetched = service.get(&created.patient_id).expect("get should succeed");
        assert_eq!(fetched, created, "every stored field should round-trip");
        assert_eq!(fetched.first_name, "June");
        assert_eq!(fetched.email.as_deref(), Some("june@example.org"));
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let service = service();
        let a = service.create(&write("A", "One", "M")).expect("create should succeed");
        let b = service.create(&write("B", "Two", "M")).expect("create should succeed");

        let year = Utc::now().date_naive().year();
        assert_eq!(a.patient_id, format!("PAT{year}0001"));
        assert_eq!(b.patient_id, format!("PAT{year}0002"));
    }

    #[test]
    fn test_concurrent_creates_never_share_an_id() {
        let db = Database::open_in_memory().expect("open should succeed");
        let mut handles = Vec::new();
        for i in 0..8 {
            let service = PatientService::new(db.clone());
            handles.push(std::thread::spawn(move || {
                service
                    .create(&write(&format!("P{i}"), "Concurrent", "M"))
                    .expect("create should succeed")
                    .patient_id
            }));
        }

        let mut ids: Vec<String> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8, "all allocated ids should be distinct");
    }

    #[test]
    fn test_create_validation_failure_persists_nothing() {
        let service = service();
        let err = service
            .create(&PatientWrite::default())
            .expect_err("empty payload should fail");
        assert!(matches!(err, PatientError::Validation(_)));
        assert_eq!(
            service.stats().expect("stats should succeed").total_patients,
            0,
            "no partial row should have been written"
        );
    }

    #[test]
    fn test_update_is_partial_and_bumps_updated_at() {
        let service = service();
        let created = service.create(&write("June", "Osei", "F")).expect("create should succeed");

        let patch = PatientWrite {
            phone_number: Some("+15550000000".into()),
            ..PatientWrite::default()
        };
        let updated = service
            .update(&created.patient_id, &patch)
            .expect("update should succeed");

        assert_eq!(updated.phone_number, "+15550000000");
        assert_eq!(updated.first_name, "June", "untouched fields should survive");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let fetched = service.get(&created.patient_id).expect("get should succeed");
        assert_eq!(fetched.phone_number, "+15550000000");
    }

    #[test]
    fn test_update_invalid_field_leaves_record_unchanged() {
        let service = service();
        let created = service.create(&write("June", "Osei", "F")).expect("create should succeed");

        let patch = PatientWrite {
            phone_number: Some("bad".into()),
            ..PatientWrite::default()
        };
        let err = service
            .update(&created.patient_id, &patch)
            .expect_err("invalid phone should fail");
        match err {
            PatientError::Validation(errors) => {
                assert!(errors.get("phone_number").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let fetched = service.get(&created.patient_id).expect("get should succeed");
        assert_eq!(fetched.phone_number, created.phone_number);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let service = service();
        let err = service
            .update("PAT20240001", &PatientWrite::default())
            .expect_err("unknown id should fail");
        assert!(matches!(err, PatientError::PatientNotFound(_)));
    }

    #[test]
    fn test_delete_then_retrieve_is_not_found() {
        let service = service();
        let created = service.create(&write("June", "Osei", "F")).expect("create should succeed");

        service.delete(&created.patient_id).expect("delete should succeed");

        let err = service.get(&created.patient_id).expect_err("get should fail");
        assert!(matches!(err, PatientError::PatientNotFound(_)));

        let err = service.delete(&created.patient_id).expect_err("second delete should fail");
        assert!(matches!(err, PatientError::PatientNotFound(_)));
    }

    #[test]
    fn test_list_is_most_recently_created_first() {
        let service = service();
        let first = service.create(&write("A", "One", "M")).expect("create should succeed");
        let second = service.create(&write("B", "Two", "F")).expect("create should succeed");

        let listed = service.list(None).expect("list should succeed");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].patient_id, second.patient_id);
        assert_eq!(listed[1].patient_id, first.patient_id);
    }

    #[test]
    fn test_search_matches_exactly_one_last_name() {
        let service = service();
        service.create(&write("June", "Osei", "F")).expect("create should succeed");
        service.create(&write("Bola", "Adeyemi", "M")).expect("create should succeed");

        let hits = service.list(Some("dey")).expect("search should succeed");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].last_name, "Adeyemi");
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let service = service();
        let created = service.create(&write("June", "Osei", "F")).expect("create should succeed");

        assert_eq!(service.list(Some("JUNE")).expect("search").len(), 1);
        assert_eq!(service.list(Some("osei")).expect("search").len(), 1);
        let id_hit = service
            .list(Some(&created.patient_id.to_lowercase()))
            .expect("search");
        assert_eq!(id_hit.len(), 1, "patient_id should be searchable");
        assert_eq!(service.list(Some("555123")).expect("search").len(), 1);
    }

    #[test]
    fn test_search_without_hits_returns_empty() {
        let service = service();
        service.create(&write("June", "Osei", "F")).expect("create should succeed");
        assert!(service.list(Some("zzz-no-match")).expect("search").is_empty());
    }

    #[test]
    fn test_search_treats_like_metacharacters_literally() {
        let service = service();
        service.create(&write("June", "Osei", "F")).expect("create should succeed");
        assert!(service.list(Some("%")).expect("search").is_empty());
        assert!(service.list(Some("_")).expect("search").is_empty());
    }

    #[test]
    fn test_stats_counts_by_gender() {
        let service = service();
        for name in ["A", "B", "C"] {
            service.create(&write(name, "Male", "M")).expect("create should succeed");
        }
        for name in ["D", "E"] {
            service.create(&write(name, "Female", "F")).expect("create should succeed");
        }

        let stats = service.stats().expect("stats should succeed");
        assert_eq!(
            stats,
            StatsRes {
                total_patients: 5,
                male_patients: 3,
                female_patients: 2,
                other_patients: 0,
            }
        );
    }
}
