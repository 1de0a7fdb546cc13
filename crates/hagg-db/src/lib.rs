//! # Hagg DB
//!
//! User repository for the hagg server.
//!
//! - [`User`]: the stored user; `uid` is the login secret, `display_name` the
//!   stable policy subject
//! - [`UserStore`]: lookup seam used by authentication
//! - [`PgUserStore`]: SQLx/PostgreSQL implementation
//! - [`MemoryUserStore`]: in-process implementation for development and tests
//!
//! # Example
//!
//! ```ignore
//! use hagg_db::{PgUserStore, UserStore, init_db_pool};
//!
//! let pool = init_db_pool(&database_url).await?;
//! let users = PgUserStore::new(pool);
//! let alice = users.find_by_uid("u-1").await?;
//! ```

pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use memory::MemoryUserStore;
pub use model::User;
pub use postgres::{PgUserStore, init_db_pool};
pub use store::{UserStore, UserStoreError};

// Re-export PgPool for convenience
pub use sqlx::PgPool;
