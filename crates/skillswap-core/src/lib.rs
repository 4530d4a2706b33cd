//! skillswap-core - client library for the SkillSwap skill-exchange service.
//!
//! - `api`: `ApiClient` for every backend endpoint and the `ApiError` taxonomy
//! - `auth`: `SessionStore`, the logged-in identity mirrored to durable storage
//! - `storage`: the `KeyValueStore` trait and its memory, file, encrypted, and
//!   keychain backends
//! - `feed`: match suggestions with local like/pass state
//! - `config`: configuration file, environment overrides, base URL selection
//! - `models`: user profiles, request bodies, matches

pub mod api;
pub mod auth;
pub mod config;
pub mod feed;
pub mod models;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionError, SessionState, SessionStore};
pub use config::Config;
pub use feed::MatchFeed;
pub use storage::{KeyValueStore, StorageError};
