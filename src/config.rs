use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Where repositories keep their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub invite_register_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match get("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
        };

        let database_url = get("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required for the postgres storage backend");
        }

        let jwt = JwtConfig {
            secret: get("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET is required"))?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "gymroom".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "gymroom-users".into()),
            ttl_minutes: get("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: get("JWT_REFRESH_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };

        Ok(Self {
            storage,
            database_url,
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            jwt,
            invite_register_url: get("INVITE_REGISTER_URL")
                .unwrap_or_else(|| "http://localhost:5173/auth/register".into()),
        })
    }

    /// In-memory config with fixed JWT settings, for tests and local runs.
    pub fn for_tests() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database_url: None,
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            invite_register_url: "http://localhost/register".into(),
        }
    }
}
