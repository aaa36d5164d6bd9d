//! Transport seam used by download tasks, plus the HTTP implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{DownloadError, DownloadResult};

/// File name used when the URL has no usable last path segment.
const DEFAULT_FORM_NAME: &str = "form.xml";

/// Form written by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedForm {
    /// File name inside the forms directory.
    pub name: String,
    /// Size of the written body in bytes.
    pub bytes: u64,
}

/// Performs the actual fetch of a form into the forms directory.
#[async_trait]
pub trait FormTransport: Send + Sync {
    /// Fetch one form. Each call is an independent attempt; no retries.
    async fn fetch(&self) -> DownloadResult<FetchedForm>;
}

/// Downloads a single form over HTTP(S) with a plain `GET`.
#[derive(Debug, Clone)]
pub struct HttpFormTransport {
    client: Client,
    url: Url,
    forms_dir: PathBuf,
}

impl HttpFormTransport {
    /// Build a transport around an existing client.
    #[must_use]
    pub fn new(client: Client, url: Url, forms_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            url,
            forms_dir: forms_dir.into(),
        }
    }

    /// Build a transport with its own client bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_timeout(
        url: Url,
        forms_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> DownloadResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| DownloadError::Http {
                url: url.to_string(),
                source,
            })?;
        Ok(Self::new(client, url, forms_dir))
    }

    /// Name the downloaded form is stored under.
    #[must_use]
    pub fn target_name(&self) -> String {
        self.url
            .path_segments()
            .and_then(Iterator::last)
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .unwrap_or(DEFAULT_FORM_NAME)
            .to_string()
    }

    /// Directory forms are written into.
    #[must_use]
    pub fn forms_dir(&self) -> &Path {
        &self.forms_dir
    }

    async fn write_form(&self, name: &str, body: &[u8]) -> DownloadResult<()> {
        tokio::fs::create_dir_all(&self.forms_dir)
            .await
            .map_err(|source| DownloadError::Io {
                operation: "create_forms_dir",
                path: self.forms_dir.clone(),
                source,
            })?;

        let partial = self.forms_dir.join(format!(".{name}.part"));
        tokio::fs::write(&partial, body)
            .await
            .map_err(|source| DownloadError::Io {
                operation: "write_partial",
                path: partial.clone(),
                source,
            })?;

        let target = self.forms_dir.join(name);
        if let Err(source) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(DownloadError::Io {
                operation: "publish_form",
                path: target,
                source,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FormTransport for HttpFormTransport {
    async fn fetch(&self) -> DownloadResult<FetchedForm> {
        let url = self.url.to_string();
        debug!(url = %url, "requesting form");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| DownloadError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| DownloadError::Http { url, source })?;
        let name = self.target_name();
        self.write_form(&name, &body).await?;

        Ok(FetchedForm {
            name,
            bytes: u64::try_from(body.len()).unwrap_or(u64::MAX),
        })
    }
}
