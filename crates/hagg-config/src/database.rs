/// User repository configuration.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string; when unset the server keeps
///   users in memory
/// - `SEED_USERS`: comma separated `uid:display_name` pairs loaded into the
///   in-memory store
#[derive(Clone, Debug, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub seed_users: Vec<(String, String)>,
}

impl DatabaseConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            seed_users: lookup("SEED_USERS")
                .map(|raw| parse_seed(&raw))
                .unwrap_or_default(),
        }
    }
}

fn parse_seed(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (uid, name) = pair.split_once(':')?;
            let (uid, name) = (uid.trim(), name.trim());
            (!uid.is_empty() && !name.is_empty()).then(|| (uid.to_string(), name.to_string()))
        })
        .collect()
}
