//! Policy-engine seam.
//!
//! [`Enforcer`] is the capability the rest of the application sees; any rule
//! engine (or a test fake) can sit behind it. [`Permissions`] normalizes calls
//! into the `can(subject, action)` contract while keeping engine faults
//! distinguishable from a denial through [`Permissions::check`].
//!
//! Nothing here caches results: every call evaluates against the live policy
//! set, so a reload inside the engine applies to the next check.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EnforcerError {
    #[error("policy engine error: {0}")]
    Engine(String),

    #[error("policy could not be loaded: {0}")]
    Policy(String),
}

/// Black-box policy engine.
///
/// Implementations are shared across all requests and are responsible for
/// their own thread-safety, including reads that race a policy reload.
/// Action identifiers are opaque strings such as `"dashboard:view"`.
#[async_trait]
pub trait Enforcer: Send + Sync {
    async fn enforce(&self, subject: &str, action: &str) -> Result<bool, EnforcerError>;

    async fn roles_for(&self, subject: &str) -> Result<Vec<String>, EnforcerError>;

    /// `[subject, action]` pairs granted to the subject, directly or through roles.
    async fn permissions_for(&self, subject: &str) -> Result<Vec<[String; 2]>, EnforcerError>;
}

#[derive(Clone)]
pub struct Permissions {
    engine: Arc<dyn Enforcer>,
}

impl Permissions {
    pub fn new(engine: Arc<dyn Enforcer>) -> Self {
        Self { engine }
    }

    /// Evaluates a permission, surfacing engine faults as errors.
    #[instrument(skip(self))]
    pub async fn check(&self, subject: &str, action: &str) -> Result<bool, EnforcerError> {
        let allowed = self.engine.enforce(subject, action).await?;
        debug!(allowed, "Permission evaluated");
        Ok(allowed)
    }

    /// Boolean convenience over [`check`](Self::check).
    ///
    /// A fault is logged at error level and answers `false`; callers that must
    /// tell a fault from a denial use `check`.
    pub async fn can(&self, subject: &str, action: &str) -> bool {
        match self.check(subject, action).await {
            Ok(allowed) => allowed,
            Err(e) => {
                error!(subject, action, error = %e, "Permission check failed");
                false
            }
        }
    }

    pub async fn roles_for(&self, subject: &str) -> Result<Vec<String>, EnforcerError> {
        self.engine.roles_for(subject).await
    }

    pub async fn permissions_for(&self, subject: &str) -> Result<Vec<[String; 2]>, EnforcerError> {
        self.engine.permissions_for(subject).await
    }
}
