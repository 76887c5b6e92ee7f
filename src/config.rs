use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub migrations_path: PathBuf,
    /// Whether new accounts may be registered through `/api/auth/signup`.
    pub allow_signup: bool,
    /// Mark the session cookie `Secure` (only when served over HTTPS).
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("TROUSSEAU_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("TROUSSEAU_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7171),
            database_path: env::var("TROUSSEAU_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/trousseau.db")),
            migrations_path: env::var("TROUSSEAU_MIGRATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("migrations")),
            allow_signup: env_flag("TROUSSEAU_ALLOW_SIGNUP", true),
            secure_cookies: env_flag("TROUSSEAU_SECURE_COOKIES", false),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => parse_flag(&v).unwrap_or_else(|| {
            tracing::warn!(variable = name, value = %v, "Unrecognised boolean, using default");
            default
        }),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
