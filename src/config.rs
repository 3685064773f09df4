use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use chrono::NaiveDate;
use dotenvy::dotenv;

use crate::availability::error::AvailabilityError;
use crate::model::constraints::DEFAULT_ACTIVITIES;
use crate::model::employee::Employee;
use crate::model::horizon::{DEFAULT_HORIZON_DAYS, Horizon};
use crate::model::work_state::Granularity;
use crate::utils::session_cache::SessionBlueprint;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,

    // Session defaults
    pub roster_size: usize,
    pub employee_prefix: String,
    pub horizon_days: usize,
    pub granularity: Granularity,
    pub activities: Vec<String>,

    pub session_capacity: u64,
    pub session_idle_secs: u64,

    // Rate limiting
    pub rate_session_per_min: u32,
    pub rate_api_per_min: u32,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value '{}' for {}: {}", raw, key, e)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let activities = match lookup("ACTIVITIES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_ACTIVITIES.iter().map(|a| a.to_string()).collect(),
        };

        let config = Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            export_dir: lookup("EXPORT_DIR").unwrap_or_else(|| "exports".to_string()).into(),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()).into(),

            roster_size: parse_or(&lookup, "ROSTER_SIZE", 14)?,
            employee_prefix: lookup("EMPLOYEE_PREFIX").unwrap_or_else(|| "Employé".to_string()),
            horizon_days: parse_or(&lookup, "HORIZON_DAYS", DEFAULT_HORIZON_DAYS)?,
            granularity: parse_or(&lookup, "GRANULARITY", Granularity::WholeDay)?,
            activities,

            session_capacity: parse_or(&lookup, "SESSION_CAPACITY", 1_000)?,
            session_idle_secs: parse_or(&lookup, "SESSION_IDLE_SECS", 86_400)?, // 24h

            rate_session_per_min: parse_or(&lookup, "RATE_SESSION_PER_MIN", 60)?,
            rate_api_per_min: parse_or(&lookup, "RATE_API_PER_MIN", 1_000)?,
        };

        if config.roster_size == 0 {
            bail!("ROSTER_SIZE must be at least 1");
        }
        if config.horizon_days == 0 {
            bail!("HORIZON_DAYS must be at least 1");
        }
        if config.activities.is_empty() {
            bail!("ACTIVITIES must name at least one activity");
        }
        Ok(config)
    }

    /// Session opened with the configured roster and horizon from `start`.
    pub fn default_blueprint(&self, start: NaiveDate) -> Result<SessionBlueprint, AvailabilityError> {
        Ok(SessionBlueprint {
            roster: Employee::roster(&self.employee_prefix, self.roster_size),
            horizon: Horizon::anchored(start, self.horizon_days)?,
            granularity: self.granularity,
            activities: self.activities.clone(),
        })
    }
}
