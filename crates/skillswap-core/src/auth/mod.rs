//! Authentication state for the client.
//!
//! This module provides `SessionStore`: the token and profile of the logged
//! in user, restored from and written through to a durable
//! `KeyValueStore`. It is an explicit value owned by the caller; there is
//! no global session.

pub mod session;

pub use session::{SessionError, SessionState, SessionStore, TOKEN_KEY, USER_KEY};
