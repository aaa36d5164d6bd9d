//! Validation helpers for raw configuration values.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::LogFormatSetting;

pub(crate) fn parse_forms_dir(value: &str) -> ConfigResult<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid("forms_dir", "empty", value));
    }
    Ok(PathBuf::from(trimmed))
}

pub(crate) fn parse_download_url(value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|_| ConfigError::invalid("download_url", "unparseable", value))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::invalid(
            "download_url",
            "unsupported_scheme",
            value,
        )),
    }
}

pub(crate) fn parse_timeout(seconds: u64) -> ConfigResult<Duration> {
    if seconds == 0 {
        return Err(ConfigError::invalid("timeout_secs", "zero", "0"));
    }
    Ok(Duration::from_secs(seconds))
}

pub(crate) fn parse_log_format(value: &str) -> ConfigResult<LogFormatSetting> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormatSetting::Json),
        "pretty" => Ok(LogFormatSetting::Pretty),
        "auto" | "" => Ok(LogFormatSetting::Auto),
        _ => Err(ConfigError::invalid("log_format", "unknown_format", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_requires_http_scheme() {
        assert!(parse_download_url("https://forms.example.org/a.xml").is_ok());
        assert!(parse_download_url("http://127.0.0.1:8080/a.xml").is_ok());
        let err = parse_download_url("ftp://forms.example.org/a.xml").expect_err("ftp");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "download_url",
                reason: "unsupported_scheme",
                ..
            }
        ));
        assert!(parse_download_url("not a url").is_err());
    }

    #[test]
    fn timeout_must_be_positive() {
        assert!(parse_timeout(0).is_err());
        assert_eq!(parse_timeout(5).ok(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn log_format_accepts_known_values() {
        assert!(matches!(parse_log_format("JSON"), Ok(LogFormatSetting::Json)));
        assert!(matches!(
            parse_log_format("pretty"),
            Ok(LogFormatSetting::Pretty)
        ));
        assert!(matches!(parse_log_format("auto"), Ok(LogFormatSetting::Auto)));
        assert!(parse_log_format("xml").is_err());
    }

    #[test]
    fn forms_dir_rejects_blank_values() {
        assert!(parse_forms_dir("   ").is_err());
        assert_eq!(
            parse_forms_dir(" /srv/forms ").ok(),
            Some(PathBuf::from("/srv/forms"))
        );
    }
}
