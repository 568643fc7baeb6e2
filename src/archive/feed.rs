use crate::archive::config::FeedConfig;
use crate::archive::keys::DayKey;
use crate::archive::record::DailyRecord;
use crate::archive::report::UnitReport;
use crate::error::ArchiveErrorCode;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use reqwest::blocking::Client;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const STAGE: &str = "feed";

/// Normalized output of one feed pull. Entries that could not be
/// normalized are reported individually instead of failing the pull.
#[derive(Debug, Clone, Default)]
pub struct FeedPull {
    pub records: Vec<(DayKey, DailyRecord)>,
    pub rejected: Vec<UnitReport>,
}

pub trait DailyFeed {
    fn name(&self) -> &'static str;
    fn pull(&self) -> Result<FeedPull>;
}

/// The Bing home page model API.
pub struct BingFeed {
    pub endpoint: String,
    pub market: String,
    pub image_host: String,
    pub timeout: Duration,
}

/// Replays a saved model API payload from disk.
pub struct FileFeed {
    pub path: PathBuf,
    pub image_host: String,
}

impl BingFeed {
    pub fn from_config(cfg: &FeedConfig) -> Self {
        Self {
            endpoint: cfg.endpoint.clone(),
            market: cfg.market.clone(),
            image_host: cfg.image_host.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

impl DailyFeed for BingFeed {
    fn name(&self) -> &'static str {
        "bing"
    }

    fn pull(&self) -> Result<FeedPull> {
        let client = Client::builder().timeout(self.timeout).build()?;
        let response = client
            .get(&self.endpoint)
            .query(&[("mkt", self.market.as_str())])
            .send()
            .with_context(|| format!("feed request to {} failed", self.endpoint))?;
        if !response.status().is_success() {
            anyhow::bail!("feed call failed with status {}", response.status());
        }
        let payload: Value = response.json().context("feed response is not json")?;
        normalize_payload(&payload, &self.image_host)
    }
}

impl DailyFeed for FileFeed {
    fn name(&self) -> &'static str {
        "file"
    }

    fn pull(&self) -> Result<FeedPull> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let payload: Value = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        normalize_payload(&payload, &self.image_host)
    }
}

pub fn normalize_payload(payload: &Value, image_host: &str) -> Result<FeedPull> {
    let entries = payload
        .get("MediaContents")
        .and_then(Value::as_array)
        .context("feed payload missing MediaContents list")?;

    let mut out = FeedPull::default();
    for (idx, entry) in entries.iter().enumerate() {
        match normalize_entry(entry, image_host) {
            Ok(pair) => out.records.push(pair),
            Err(err) => out.rejected.push(UnitReport::skipped(
                STAGE,
                format!("MediaContents[{idx}]"),
                ArchiveErrorCode::E005FeedFailed,
                format!("{err:#}"),
            )),
        }
    }
    Ok(out)
}

fn str_at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cursor = root;
    for part in path {
        cursor = cursor.get(*part)?;
    }
    cursor.as_str()
}

/// One `MediaContents` entry to a record.
///
/// `Ssd` is the start of the publishing window; the wallpaper belongs to
/// the following calendar day.
pub fn normalize_entry(entry: &Value, image_host: &str) -> Result<(DayKey, DailyRecord)> {
    let ssd = str_at(entry, &["Ssd"]).context("entry missing Ssd")?;
    let start = ssd.get(..8).context("Ssd shorter than 8 characters")?;
    let start = NaiveDate::parse_from_str(start, "%Y%m%d")
        .with_context(|| format!("Ssd `{ssd}` is not a date"))?;
    let day = start
        .checked_add_days(Days::new(1))
        .context("Ssd date out of range")?;
    let key = DayKey::from_date(day);

    let content = entry.get("ImageContent").context("entry missing ImageContent")?;
    let headline = str_at(content, &["Headline"]).unwrap_or_default();
    let title = str_at(content, &["Title"]).unwrap_or_default();
    let copyright = str_at(content, &["Copyright"]).unwrap_or_default();
    let description = str_at(content, &["Description"]).unwrap_or_default();
    let url = str_at(content, &["Image", "Url"]).context("entry missing ImageContent.Image.Url")?;
    if url.trim().is_empty() {
        anyhow::bail!("entry has an empty image url");
    }

    let url_base = url.split('_').take(2).collect::<Vec<_>>().join("_");
    let record = DailyRecord {
        date: key.date_field(),
        title: format!(
            "{headline}  |  {title} {copyright}  -  {}",
            day.format("%Y/%m/%d")
        ),
        description: description.to_string(),
        image_url: format!("{}{url_base}_UHD.jpg", image_host.trim_end_matches('/')),
    };
    Ok((key, record))
}
