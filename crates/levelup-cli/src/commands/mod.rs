pub mod challenge;
pub mod config;
pub mod daily;
pub mod level;
pub mod points;
pub mod streak;

use chrono::{DateTime, FixedOffset, Local};
use clap::Args;
use levelup_core::{Database, EngineConfig, ProgressionEngine, UserId};

/// User selection shared by every stateful command.
#[derive(Args)]
pub struct UserArgs {
    /// User whose progress is read or written
    #[arg(long, default_value = "local")]
    pub user: String,
}

impl UserArgs {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user.as_str())
    }
}

/// Engine over the on-disk database, configured from `config.toml`.
pub fn open_engine() -> Result<ProgressionEngine<Database>, Box<dyn std::error::Error>> {
    let config = EngineConfig::load()?;
    let db = Database::open()?;
    tracing::debug!(
        challenge_cap = config.caps.challenges,
        quiz_cap = config.caps.quiz,
        "engine opened"
    );
    Ok(ProgressionEngine::from_config(db, &config)?)
}

/// Current local time, or the RFC 3339 instant in `$LEVELUP_NOW` when set.
pub fn now() -> Result<DateTime<FixedOffset>, Box<dyn std::error::Error>> {
    match std::env::var("LEVELUP_NOW") {
        Ok(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|e| format!("invalid LEVELUP_NOW '{raw}': {e}").into()),
        Err(_) => Ok(Local::now().fixed_offset()),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
