//! Request handlers for the PRS REST API.

pub mod auth;
pub mod patients;
