//! Domain models for Atrium.
//!
//! These are the core types shared across all crates.

pub mod admin;
pub mod option_list;
pub mod principal;
pub mod tenant;
