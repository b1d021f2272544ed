//! # utils
//!
//! Utilities

pub mod fmt;
pub mod name;
#[cfg(target_family = "unix")]
pub mod smb;
