//! # Hagg Auth
//!
//! Authentication and authorization for the request pipeline.
//!
//! - [`authenticator`]: establishes, clears and resolves the session identity
//! - [`enforcer`]: policy-engine seam and the [`Permissions`] adapter
//! - [`casbin`]: file-backed policy engine with live reload
//! - [`errors`]: outcome taxonomy shared with the HTTP layer
//!
//! # Example
//!
//! ```ignore
//! use hagg_auth::{Permissions, SessionAuthenticator};
//!
//! let auth = SessionAuthenticator::new(users);
//! let identity = auth.login(&session, "u-1").await?;
//!
//! let perms = Permissions::new(engine);
//! if perms.check(identity.subject(), "dashboard:view").await? {
//!     // allowed
//! }
//! ```

pub mod authenticator;
pub mod casbin;
pub mod enforcer;
pub mod errors;
pub mod identity;

pub use authenticator::{SESSION_KEY_UID, SessionAuthenticator};
pub use casbin::CasbinEnforcer;
pub use enforcer::{Enforcer, EnforcerError, Permissions};
pub use errors::AuthError;
pub use identity::Identity;
