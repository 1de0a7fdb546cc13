//! Casbin-backed policy engine.
//!
//! The model and policy are read from files at startup. [`CasbinEnforcer::reload`]
//! re-reads the policy file; in-flight checks keep reading the previous policy
//! until the reload swaps it in.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use casbin::{CoreApi, DefaultModel, FileAdapter, RbacApi};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::enforcer::{Enforcer, EnforcerError};

pub struct CasbinEnforcer {
    inner: RwLock<casbin::Enforcer>,
}

impl CasbinEnforcer {
    pub fn new(enforcer: casbin::Enforcer) -> Self {
        Self {
            inner: RwLock::new(enforcer),
        }
    }

    /// Loads `model` and `policy` from disk.
    ///
    /// # Errors
    ///
    /// `EnforcerError::Policy` when either file is missing or malformed.
    pub async fn from_files(
        model: impl AsRef<Path>,
        policy: impl AsRef<Path>,
    ) -> Result<Self, EnforcerError> {
        let model = DefaultModel::from_file(model.as_ref())
            .await
            .map_err(|e| EnforcerError::Policy(e.to_string()))?;
        let policy = policy.as_ref();
        if !policy.is_file() {
            return Err(EnforcerError::Policy(format!(
                "{}: no such file",
                policy.display()
            )));
        }
        let adapter = FileAdapter::new(PathBuf::from(policy));

        let enforcer = casbin::Enforcer::new(model, adapter)
            .await
            .map_err(|e| EnforcerError::Policy(e.to_string()))?;

        Ok(Self::new(enforcer))
    }

    /// Re-reads the policy through the configured adapter.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<(), EnforcerError> {
        self.inner
            .write()
            .await
            .load_policy()
            .await
            .map_err(|e| EnforcerError::Policy(e.to_string()))?;

        info!("Policy reloaded");
        Ok(())
    }
}

#[async_trait]
impl Enforcer for CasbinEnforcer {
    async fn enforce(&self, subject: &str, action: &str) -> Result<bool, EnforcerError> {
        self.inner
            .read()
            .await
            .enforce((subject, action))
            .map_err(|e| EnforcerError::Engine(e.to_string()))
    }

    async fn roles_for(&self, subject: &str) -> Result<Vec<String>, EnforcerError> {
        let mut roles = self
            .inner
            .write()
            .await
            .get_implicit_roles_for_user(subject, None);
        roles.sort();
        Ok(roles)
    }

    async fn permissions_for(&self, subject: &str) -> Result<Vec<[String; 2]>, EnforcerError> {
        let rules = self
            .inner
            .write()
            .await
            .get_implicit_permissions_for_user(subject, None);

        let mut pairs: Vec<[String; 2]> = rules
            .into_iter()
            .filter_map(|rule| match rule.as_slice() {
                [sub, act, ..] => Some([sub.clone(), act.clone()]),
                _ => None,
            })
            .collect();
        pairs.sort();
        pairs.dedup();
        Ok(pairs)
    }
}
