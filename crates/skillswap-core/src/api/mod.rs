//! REST API client module for the SkillSwap backend.
//!
//! This module provides the `ApiClient` for the authentication, profile,
//! swap-request, feedback, and match endpoints, and the `ApiError`
//! taxonomy every call reports failures with.
//!
//! Authenticated endpoints carry the bearer token issued at login.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, HttpFailure};
