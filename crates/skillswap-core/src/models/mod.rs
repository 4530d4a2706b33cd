//! Data models for SkillSwap entities.
//!
//! - `UserProfile`, `ProfilePatch`, `RawUser`: the session's user record and
//!   the backend shape it is normalized from
//! - Request bodies for auth, profile, swap, and feedback endpoints
//! - `Match`: suggested exchange partners

pub mod auth;
pub mod feedback;
pub mod matches;
pub mod profile;
pub mod swap;
pub mod user;

pub use auth::{LoginResponse, SignupRequest};
pub use feedback::NewFeedback;
pub use matches::Match;
pub use profile::{ProfileUpdate, UserProfileUpdate};
pub use swap::{NewSwapRequest, SwapStatus};
pub use user::{normalize_user, Availability, ProfilePatch, RawUser, UserProfile};
