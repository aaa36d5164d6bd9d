//! Command-line flags with environment fallbacks.

use clap::Parser;
use formdesk_config::RawConfig;

/// Interactive manager for a directory of form definitions.
#[derive(Debug, Parser)]
#[command(name = "formdesk", about = "Browse, delete and download form definitions")]
pub struct Cli {
    /// Directory holding the forms.
    #[arg(long, env = "FORMDESK_FORMS_DIR")]
    pub forms_dir: Option<String>,
    /// Location the `download` command fetches from.
    #[arg(long, env = "FORMDESK_DOWNLOAD_URL")]
    pub download_url: Option<String>,
    /// HTTP timeout for a download, in seconds.
    #[arg(long = "timeout", env = "FORMDESK_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
    /// Log filter directive; `RUST_LOG` takes precedence.
    #[arg(long, env = "FORMDESK_LOG_LEVEL")]
    pub log_level: Option<String>,
    /// `json`, `pretty` or `auto`.
    #[arg(long, env = "FORMDESK_LOG_FORMAT")]
    pub log_format: Option<String>,
}

impl Cli {
    /// Hand the flags to configuration validation untouched.
    #[must_use]
    pub fn into_raw(self) -> RawConfig {
        RawConfig {
            forms_dir: self.forms_dir,
            download_url: self.download_url,
            timeout_secs: self.timeout_secs,
            log_level: self.log_level,
            log_format: self.log_format,
        }
    }
}
