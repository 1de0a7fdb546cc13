//! # Hagg
//!
//! Server-rendered web application with session authentication, policy-based
//! authorization and one-shot notifications delivered either as response
//! headers (partial updates) or as a markup node (full-page loads).
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── hagg-core/      # AppError, TransportMode, EventBus, Toast
//! ├── hagg-config/    # environment configuration
//! ├── hagg-session/   # sessions, stores, flash messages
//! ├── hagg-db/        # user repository
//! └── hagg-auth/      # authenticator, policy seam, casbin engine
//! src/
//! ├── middleware/     # session pipeline, guards, request context
//! ├── modules/        # pages and htmx auth endpoints
//! ├── render.rs       # HTML
//! ├── router.rs       # route table and layers
//! ├── state.rs        # shared application state
//! ├── logging.rs      # tracing setup and request logging
//! └── metrics.rs      # Prometheus metrics
//! ```
//!
//! ## Request lifecycle
//!
//! Every request gets a [`middleware::context::RequestContext`] holding its
//! transport mode, session and event buffer. Guards resolve the identity and
//! consult the policy engine; denials are `403` with a warning toast, missing
//! authentication redirects to the login page with a flash, and engine faults
//! are `500`. The session is saved and the events committed on every exit path.
//!
//! ## Environment
//!
//! ```bash
//! HOST=127.0.0.1
//! PORT=8080
//! BASE_PATH=/
//! SESSION_STORE=memory            # or redis, with REDIS_URL
//! SEED_USERS=u-alice:alice,u-bob:bob
//! CASBIN_MODEL=model.conf
//! CASBIN_POLICY=policy.csv
//! ```
//!
//! Sending `SIGHUP` to the server reloads the policy file.

pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod render;
pub mod router;
pub mod state;

// Re-export workspace crates for convenience
pub use hagg_auth;
pub use hagg_config;
pub use hagg_core;
pub use hagg_db;
pub use hagg_session;
