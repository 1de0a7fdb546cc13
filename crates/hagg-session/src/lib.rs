//! # Hagg Session
//!
//! Server-side sessions keyed by an opaque cookie id.
//!
//! This crate provides:
//! - [`Session`]: request-scoped handle over one session record
//! - [`SessionStore`]: storage seam with TTL, implemented by
//!   [`MemorySessionStore`] and [`RedisSessionStore`]
//! - [`SessionManager`]: loads a session for a cookie value and persists it
//!   back after the response
//! - [`FlashStore`]: one-shot messages that survive exactly one redirect
//!
//! # Example
//!
//! ```ignore
//! use std::{sync::Arc, time::Duration};
//! use hagg_session::{MemorySessionStore, SessionManager};
//!
//! let store = Arc::new(MemorySessionStore::new());
//! let manager = SessionManager::new(store, Duration::from_secs(3600));
//! let session = manager.load(cookie_value).await?;
//! session.insert("uid", "u-1");
//! manager.save(&session).await?;
//! ```

pub mod flash;
pub mod manager;
pub mod memory;
pub mod record;
pub mod redis;
pub mod session;
pub mod store;

pub use flash::{FlashMessage, FlashStore};
pub use manager::SessionManager;
pub use memory::MemorySessionStore;
pub use record::{SessionId, SessionRecord, SessionValue};
pub use redis::RedisSessionStore;
pub use session::Session;
pub use store::{SessionError, SessionStore};
