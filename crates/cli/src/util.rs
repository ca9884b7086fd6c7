use std::path::PathBuf;

use actions_logs_core::models::parse_date;
use time::Date;
use url::Url;

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<PathBuf, String> { Ok(PathBuf::from(value)) }

pub fn date(value: &str) -> Result<Date, String> { parse_date(value).map_err(|e| e.to_string()) }

pub fn url(value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|e| format!("Invalid URL '{value}': {e}"))
}

pub fn timeout(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("Timeout must be at least 1 second".to_string()),
        Ok(secs) => Ok(secs),
        Err(e) => Err(format!("Invalid timeout '{value}': {e}")),
    }
}
