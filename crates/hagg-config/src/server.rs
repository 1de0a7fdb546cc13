use crate::{ConfigError, parse_number};

/// HTTP listener configuration.
///
/// # Environment Variables
///
/// - `HOST`: bind address (default: `127.0.0.1`)
/// - `PORT`: bind port (default: `8080`)
/// - `BASE_PATH`: mount prefix for every route (default: `/`)
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_path: String,
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_number(lookup, "PORT", 8080)?,
            base_path: lookup("BASE_PATH").unwrap_or_else(|| "/".to_string()),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base path without a trailing slash; the root mount is the empty string.
    pub fn mount_prefix(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_base(base: &str) -> ServerConfig {
        let base = base.to_string();
        ServerConfig::from_lookup(&move |key: &str| (key == "BASE_PATH").then(|| base.clone()))
            .unwrap()
    }

    #[test]
    fn root_mount_prefix_is_empty() {
        assert_eq!(with_base("/").mount_prefix(), "");
    }

    #[test]
    fn nested_mount_prefix_drops_trailing_slash() {
        assert_eq!(with_base("/app/").mount_prefix(), "/app");
    }
}
