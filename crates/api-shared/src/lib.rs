//! # API Shared
//!
//! Wire-format types and utilities shared by the PRS REST API, the CLI, and
//! the core services:
//! - Request/response DTOs (patient projections, auth envelopes, stats)
//! - Per-field validation error map
//! - Health check service
//!
//! Types here are serialization shapes only; business rules live in
//! `prs-core`.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::{
    AuthRes, CreatePatientRes, FieldErrors, HealthRes, LoginReq, PatientDetail, PatientSummary,
    PatientWrite, RegisterReq, StatsRes, UserPublic, ValidationErrorRes,
};
