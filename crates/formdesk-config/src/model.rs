//! Raw and validated configuration models.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::defaults;
use crate::error::ConfigResult;
use crate::validate::{parse_download_url, parse_forms_dir, parse_log_format, parse_timeout};

/// Settings exactly as supplied by flags, environment, or a document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Directory holding the forms.
    pub forms_dir: Option<String>,
    /// Location the download action fetches from.
    pub download_url: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Log filter directive (e.g. `info`, `formdesk_surface=debug`).
    pub log_level: Option<String>,
    /// `json`, `pretty`, or `auto`.
    pub log_format: Option<String>,
}

/// Requested log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormatSetting {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
    /// Let the build profile decide.
    #[default]
    Auto,
}

/// Validated configuration handed to the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the forms.
    pub forms_dir: PathBuf,
    /// Location the download action fetches from; downloads are refused without it.
    pub download_url: Option<Url>,
    /// HTTP timeout for a download.
    pub request_timeout: Duration,
    /// Log filter directive.
    pub log_level: String,
    /// Requested log output format.
    pub log_format: LogFormatSetting,
}

impl AppConfig {
    /// Validate `raw`, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first field that fails validation.
    pub fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        let forms_dir = parse_forms_dir(raw.forms_dir.as_deref().unwrap_or(defaults::FORMS_DIR))?;
        let download_url = raw
            .download_url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(parse_download_url)
            .transpose()?;
        let request_timeout =
            parse_timeout(raw.timeout_secs.unwrap_or(defaults::REQUEST_TIMEOUT_SECS))?;
        let log_format = raw
            .log_format
            .as_deref()
            .map(parse_log_format)
            .transpose()?
            .unwrap_or_default();
        let log_level = raw
            .log_level
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| defaults::LOG_LEVEL.to_string());

        Ok(Self {
            forms_dir,
            download_url,
            request_timeout,
            log_level,
            log_format,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            forms_dir: PathBuf::from(defaults::FORMS_DIR),
            download_url: None,
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            log_level: defaults::LOG_LEVEL.to_string(),
            log_format: LogFormatSetting::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn empty_raw_config_uses_defaults() -> ConfigResult<()> {
        let config = AppConfig::from_raw(RawConfig::default())?;
        let defaults = AppConfig::default();
        assert_eq!(config.forms_dir, defaults.forms_dir);
        assert_eq!(config.request_timeout, defaults.request_timeout);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormatSetting::Auto);
        assert!(config.download_url.is_none());
        Ok(())
    }

    #[test]
    fn raw_config_from_document_is_validated() -> Result<(), Box<dyn std::error::Error>> {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "forms_dir": "/sdcard/odk/forms",
                "download_url": "https://forms.example.org/forms/household.xml",
                "timeout_secs": 10,
                "log_format": "json"
            }"#,
        )?;
        let config = AppConfig::from_raw(raw)?;
        assert_eq!(config.forms_dir, PathBuf::from("/sdcard/odk/forms"));
        assert_eq!(
            config.download_url.as_ref().map(Url::as_str),
            Some("https://forms.example.org/forms/household.xml")
        );
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.log_format, LogFormatSetting::Json);
        Ok(())
    }

    #[test]
    fn invalid_fields_are_reported_by_name() {
        let raw = RawConfig {
            timeout_secs: Some(0),
            ..RawConfig::default()
        };
        let err = AppConfig::from_raw(raw).expect_err("zero timeout");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "timeout_secs",
                ..
            }
        ));

        let raw = RawConfig {
            download_url: Some("mailto:forms@example.org".into()),
            ..RawConfig::default()
        };
        assert!(AppConfig::from_raw(raw).is_err());
    }

    #[test]
    fn blank_download_url_means_unset() -> ConfigResult<()> {
        let raw = RawConfig {
            download_url: Some("  ".into()),
            ..RawConfig::default()
        };
        assert!(AppConfig::from_raw(raw)?.download_url.is_none());
        Ok(())
    }
}
