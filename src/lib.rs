//! Employee records backend: profiles, admin users, settings and
//! attendance/leave/invoice reports over JSON/HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod routes;
pub mod utils;
