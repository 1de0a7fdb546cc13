use std::path::PathBuf;

/// Policy engine configuration.
///
/// # Environment Variables
///
/// - `CASBIN_MODEL`: model definition file (default: `model.conf`)
/// - `CASBIN_POLICY`: policy file (default: `policy.csv`)
#[derive(Clone, Debug)]
pub struct CasbinConfig {
    pub model_path: PathBuf,
    pub policy_path: PathBuf,
}

impl CasbinConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            model_path: lookup("CASBIN_MODEL")
                .unwrap_or_else(|| "model.conf".into())
                .into(),
            policy_path: lookup("CASBIN_POLICY")
                .unwrap_or_else(|| "policy.csv".into())
                .into(),
        }
    }
}
