// src/config/settings.rs
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TARGET_URL: &str = "https://erasmus.tuke.sk/vyzvy-na-studentsku-mobilitu/";
pub const DEFAULT_SITE_ORIGIN: &str = "https://erasmus.tuke.sk";
pub const DEFAULT_LAST_KNOWN_DATE: &str = "2024-05-06";
pub const DEFAULT_DATA_FILE: &str = "erasmus_data.json";
pub const DEFAULT_LOG_FILE: &str = "erasmus_tracker.log";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Variables that must be present before anything is sent.
const REQUIRED_EMAIL_VARS: [&str; 3] = ["EMAIL_FROM", "EMAIL_PASSWORD", "EMAIL_TO"];

/// Runtime settings, read from the environment (`.env` is honoured by the binaries).
#[derive(Debug, Clone)]
pub struct Settings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub email_from: Option<String>,
    pub email_password: Option<String>,
    pub email_to: Option<String>,
    pub target_url: String,
    /// Prefix for root-relative links found on the page.
    pub site_origin: String,
    pub check_interval: Duration,
    /// Posts dated on or before this day are ignored.
    pub last_known_date: NaiveDate,
    pub data_file: PathBuf,
    /// `None` when LOG_FILE is set to an empty string.
    pub log_file: Option<PathBuf>,
    pub user_agent: String,
    pub fetch_timeout: Duration,
}

/// Notifier settings after validation; every field is known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub from: String,
    pub password: String,
    pub to: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Build settings from any key lookup (tests pass a map instead of the process env).
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opt = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| opt(key).unwrap_or_else(|| default.to_string());

        let smtp_port: u16 = parse_var(&get, "SMTP_PORT", 587)?;
        let interval_hours: u64 = parse_var(&get, "CHECK_INTERVAL_HOURS", 6)?;
        let timeout_secs: u64 = parse_var(&get, "FETCH_TIMEOUT_SECS", 30)?;

        let date_raw = or("LAST_KNOWN_DATE", DEFAULT_LAST_KNOWN_DATE);
        let last_known_date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d")
            .with_context(|| format!("LAST_KNOWN_DATE must be YYYY-MM-DD, got {date_raw:?}"))?;

        // LOG_FILE="" explicitly disables the file log
        let log_file = match get("LOG_FILE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(PathBuf::from(v.trim())),
            None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };

        Ok(Self {
            smtp_server: or("SMTP_SERVER", "smtp.gmail.com"),
            smtp_port,
            email_from: opt("EMAIL_FROM"),
            email_password: opt("EMAIL_PASSWORD"),
            email_to: opt("EMAIL_TO"),
            target_url: or("TARGET_URL", DEFAULT_TARGET_URL),
            site_origin: or("SITE_ORIGIN", DEFAULT_SITE_ORIGIN),
            check_interval: Duration::from_secs(interval_hours.max(1) * 3600),
            last_known_date,
            data_file: PathBuf::from(or("DATA_FILE", DEFAULT_DATA_FILE)),
            log_file,
            user_agent: or("USER_AGENT", DEFAULT_USER_AGENT),
            fetch_timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }

    /// Fails listing every missing notifier variable.
    pub fn email(&self) -> Result<EmailSettings> {
        match (&self.email_from, &self.email_password, &self.email_to) {
            (Some(from), Some(password), Some(to)) => Ok(EmailSettings {
                smtp_server: self.smtp_server.clone(),
                smtp_port: self.smtp_port,
                from: from.clone(),
                password: password.clone(),
                to: to.clone(),
            }),
            (from, password, to) => {
                let missing: Vec<&str> = REQUIRED_EMAIL_VARS
                    .iter()
                    .zip([from.is_none(), password.is_none(), to.is_none()])
                    .filter(|(_, absent)| *absent)
                    .map(|(k, _)| *k)
                    .collect();
                bail!("Missing required configuration: {}", missing.join(", "))
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.email().map(|_| ())
    }
}

fn parse_var<F, T>(get: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {v:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_vars(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.smtp_server, "smtp.gmail.com");
        assert_eq!(s.smtp_port, 587);
        assert_eq!(s.target_url, DEFAULT_TARGET_URL);
        assert_eq!(s.last_known_date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(s.fetch_timeout, Duration::from_secs(30));
        assert_eq!(s.check_interval, Duration::from_secs(6 * 3600));
        assert_eq!(s.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(s.log_file, Some(PathBuf::from(DEFAULT_LOG_FILE)));
    }

    #[test]
    fn validation_lists_all_missing_fields() {
        let s = settings(&[("EMAIL_FROM", "me@example.com"), ("EMAIL_TO", "  ")]).unwrap();
        let err = s.validate().unwrap_err().to_string();
        assert_eq!(err, "Missing required configuration: EMAIL_PASSWORD, EMAIL_TO");
    }

    #[test]
    fn complete_email_settings_validate() {
        let s = settings(&[
            ("EMAIL_FROM", "me@example.com"),
            ("EMAIL_PASSWORD", "secret"),
            ("EMAIL_TO", "you@example.com"),
            ("SMTP_PORT", "2525"),
        ])
        .unwrap();
        let email = s.email().unwrap();
        assert_eq!(email.smtp_port, 2525);
        assert_eq!(email.to, "you@example.com");
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(settings(&[("SMTP_PORT", "abc")]).is_err());
        assert!(settings(&[("LAST_KNOWN_DATE", "6.5.2024")]).is_err());
    }

    #[test]
    fn empty_log_file_disables_file_log() {
        let s = settings(&[("LOG_FILE", "")]).unwrap();
        assert_eq!(s.log_file, None);
    }
}
