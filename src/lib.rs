//! medauth - token-based authentication for the doctor appointment service
//!
//! Password verification, signed session tokens, and a request gate that
//! checks bearer tokens against an ordered route policy.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;

pub use config::Config;
pub use error::Error;
