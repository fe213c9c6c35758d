//! Mobile-facing bindings for GeoMarks core.

pub mod api;
