//! Application-level configuration: new-game defaults, admin credentials and store selection.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BINGO_ADMIN_CONFIG_PATH";
const ADMIN_EMAIL_ENV: &str = "ADMIN_EMAIL";
const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
const SESSION_TTL_ENV: &str = "ADMIN_SESSION_TTL_SECS";
const DEFAULT_ADMIN_EMAIL: &str = "admin@bingo.local";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Values applied to a new game when the request leaves them out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameDefaults {
    /// Display name.
    pub name: String,
    /// Description stored in the game settings.
    pub description: String,
    /// Line prize.
    pub prize_line: f64,
    /// Column prize.
    pub prize_column: f64,
    /// Full card prize.
    pub prize_full: f64,
}

impl Default for GameDefaults {
    fn default() -> Self {
        Self {
            name: "Novo Jogo de Bingo".into(),
            description: "Jogo criado pelo painel admin".into(),
            prize_line: 50.0,
            prize_column: 100.0,
            prize_full: 500.0,
        }
    }
}

/// Single admin account allowed to log in.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    /// Login e-mail.
    pub email: String,
    /// Login password.
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl AdminCredentials {
    /// Build credentials from explicit values.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Read `ADMIN_EMAIL` / `ADMIN_PASSWORD`, falling back to development defaults.
    pub fn from_env() -> Self {
        let email = non_empty_env(ADMIN_EMAIL_ENV);
        let password = non_empty_env(ADMIN_PASSWORD_ENV);

        match (email, password) {
            (Some(email), Some(password)) => {
                info!(%email, "admin credentials loaded from environment");
                Self { email, password }
            }
            (email, password) => {
                if email.is_some() || password.is_some() {
                    warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set");
                }
                warn!(
                    email = DEFAULT_ADMIN_EMAIL,
                    "using built-in development admin credentials"
                );
                Self::new(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            }
        }
    }
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Defaults for new games.
    pub game_defaults: GameDefaults,
    /// Whether reset puts participants back to waiting when the request does not say.
    pub reset_participants: bool,
    /// Admin login.
    pub admin: AdminCredentials,
    /// Session lifetime.
    pub session_ttl: Duration,
}

impl AppConfig {
    /// Load the file configuration and the environment, falling back to defaults.
    pub fn load() -> Self {
        let file = FileConfig::load();
        Self {
            game_defaults: file.game_defaults,
            reset_participants: file.reset_participants,
            admin: AdminCredentials::from_env(),
            session_ttl: session_ttl_from_env(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game_defaults: GameDefaults::default(),
            reset_participants: true,
            admin: AdminCredentials::default(),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct FileConfig {
    game_defaults: GameDefaults,
    reset_participants: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            game_defaults: GameDefaults::default(),
            reset_participants: true,
        }
    }
}

impl FileConfig {
    fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<FileConfig>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded game defaults from config");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

/// Storage backend selected with `STORE_BACKEND`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// MongoDB through `MONGO_URI` / `MONGO_DB`.
    Mongo,
    /// PostgREST (Supabase) through `POSTGREST_URL` / `POSTGREST_API_KEY`.
    PostgRest,
    /// Process-local store, lost on restart.
    Memory,
}

impl StoreBackend {
    /// Read `STORE_BACKEND`; unknown values fall back to MongoDB with a warning.
    pub fn from_env() -> Self {
        match non_empty_env("STORE_BACKEND").as_deref() {
            None | Some("mongo") | Some("mongodb") => StoreBackend::Mongo,
            Some("postgrest") | Some("supabase") => StoreBackend::PostgRest,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                warn!(backend = other, "unknown STORE_BACKEND; using mongo");
                StoreBackend::Mongo
            }
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn session_ttl_from_env() -> Duration {
    match non_empty_env(SESSION_TTL_ENV) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(value = %raw, "invalid {SESSION_TTL_ENV}; using 24h");
                DEFAULT_SESSION_TTL
            }
        },
        None => DEFAULT_SESSION_TTL,
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_fills_missing_fields_with_defaults() {
        let parsed: FileConfig =
            serde_json::from_str(r#"{ "game_defaults": { "prize_full": 1000 } }"#).unwrap();
        assert_eq!(parsed.game_defaults.prize_full, 1000.0);
        assert_eq!(parsed.game_defaults.prize_line, 50.0);
        assert_eq!(parsed.game_defaults.name, "Novo Jogo de Bingo");
        assert!(parsed.reset_participants);
    }

    #[test]
    fn credentials_debug_hides_the_password() {
        let creds = AdminCredentials::new("a@b.c", "secret");
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
