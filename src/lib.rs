//! ci-limits Library
//!
//! This library resolves the build quotas of a CI platform: the plan a user
//! pays for, the apps the user uploads, and the overrides that public apps
//! can carry.

pub mod config;
pub mod limits;
