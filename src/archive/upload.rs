use crate::archive::config::UploadConfig;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub trait Uploader {
    fn name(&self) -> &'static str;
    /// Persist the local file under `logical_path` in remote storage.
    fn upload(&self, logical_path: &str, local_path: &Path) -> Result<()>;
}

/// Object storage reachable with a plain `PUT {endpoint}/{bucket}/{key}`.
pub struct HttpUploader {
    pub endpoint: String,
    pub bucket: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl HttpUploader {
    /// `None` when uploads are disabled or no endpoint is configured.
    pub fn from_config(cfg: &UploadConfig) -> Option<Self> {
        if !cfg.enabled || cfg.endpoint.trim().is_empty() {
            return None;
        }
        Some(Self {
            endpoint: cfg.endpoint.trim().to_string(),
            bucket: cfg.bucket.trim().to_string(),
            token: env_non_empty("WALLPAPER_UPLOAD_TOKEN"),
            timeout: Duration::from_secs(cfg.timeout_secs),
        })
    }

    pub fn object_url(&self, logical_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket.trim_matches('/'),
            logical_path.trim_start_matches('/')
        )
    }
}

impl Uploader for HttpUploader {
    fn name(&self) -> &'static str {
        "http"
    }

    fn upload(&self, logical_path: &str, local_path: &Path) -> Result<()> {
        let body = fs::read(local_path)
            .with_context(|| format!("failed to read {}", local_path.display()))?;
        let client = Client::builder().timeout(self.timeout).build()?;
        let url = self.object_url(logical_path);
        let mut request = client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .with_context(|| format!("upload request to {url} failed"))?;
        if !response.status().is_success() {
            anyhow::bail!("upload of {logical_path} failed with status {}", response.status());
        }
        Ok(())
    }
}

/// Remote key of a monthly unit.
pub fn month_object_path(month: &str) -> String {
    format!("month/{month}.json")
}
