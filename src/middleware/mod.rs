//! Request pipeline middleware.
//!
//! - [`pipeline`]: session load, panic recovery, event commit and session save
//! - [`guard`]: `require_auth` / `require_permission` route layers
//! - [`context`]: the typed per-request context and its extractors
//! - [`cookie`]: session cookie attributes
//!
//! # Layering
//!
//! ```text
//! CatchPanicLayer            last-resort recovery
//!   logging / metrics
//!     session_pipeline       context, session, recovery, commit, save
//!       require_permission   route layer (implies require_auth)
//!         handler
//! ```
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use crate::middleware::guard::{RequiredPermission, require_permission};
//!
//! let admin = Router::new()
//!     .route("/dashboard", get(dashboard))
//!     .route_layer(middleware::from_fn_with_state(
//!         RequiredPermission::new(state.clone(), "dashboard:view"),
//!         require_permission,
//!     ));
//! ```

pub mod context;
pub mod cookie;
pub mod guard;
pub mod pipeline;
