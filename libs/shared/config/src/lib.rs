use std::env;
use tracing::warn;

/// Per-slot booking ceiling used when SLOT_CAPACITY is not set. This is
/// deliberately configuration rather than doctor data: the doctor record
/// carries no per-slot limit that the allocator consults.
pub const DEFAULT_SLOT_CAPACITY: i64 = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub listen_port: u16,
    pub slot_capacity: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_URL not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            listen_port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            slot_capacity: env::var("SLOT_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .filter(|c| *c > 0)
                .unwrap_or(DEFAULT_SLOT_CAPACITY),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty() && !self.jwt_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_when_env_missing() {
        let config = AppConfig {
            database_url: String::new(),
            jwt_secret: String::new(),
            listen_port: 3000,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
        };
        assert!(!config.is_configured());
    }
}
