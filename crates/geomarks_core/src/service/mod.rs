//! Core use-case services.
//!
//! # Responsibility
//! - Compose store calls into the flows the map and detail screens run.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod marker_service;
