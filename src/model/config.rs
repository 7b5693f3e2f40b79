use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::model::entity::ValidationContext;

/// Application configuration from questlog.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the collection documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// UTC offset (`+06:00`) used when a record has no timezone of its own
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    /// Youngest age, in whole years, allowed to hold an account
    #[serde(default = "default_min_age_years")]
    pub min_age_years: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: default_data_dir(),
            default_timezone: default_timezone(),
            min_age_years: default_min_age_years(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("database")
}

fn default_timezone() -> String {
    "+00:00".to_string()
}

fn default_min_age_years() -> u32 {
    13
}

impl AppConfig {
    /// The configured default offset. Falls back to UTC if the setting does
    /// not parse; `config_io::read_config` rejects such files up front.
    pub fn default_offset(&self) -> FixedOffset {
        parse_utc_offset(&self.default_timezone).unwrap_or_else(utc)
    }

    /// Snapshot of the rule inputs as of now.
    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext::new(Utc::now(), self.min_age_years)
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parse `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `+HHMM` into a fixed offset.
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("utc") || s == "Z" {
        return Some(utc());
    }
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
