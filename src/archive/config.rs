use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub endpoint: String,
    pub market: String,
    pub image_host: String,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.bing.com/hp/api/model".to_string(),
            market: "zh-CN".to_string(),
            image_host: "https://cn.bing.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub gallery_title: String,
    pub index_title: String,
    pub index_tagline: String,
    pub thumb_width: u32,
    pub thumb_height: u32,
    pub preview_width: u32,
    pub preview_hosts: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gallery_title: "Bing Wallpapers".to_string(),
            index_title: "My Bing Wallpaper".to_string(),
            index_tagline: "Daily Bing wallpapers collection".to_string(),
            thumb_width: 240,
            thumb_height: 135,
            preview_width: 480,
            preview_hosts: vec!["bing.com".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub bucket: String,
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            bucket: "my-bing-wallpaper".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArchiveConfig {
    pub feed: FeedConfig,
    pub render: RenderOptions,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialArchiveConfig {
    feed: Option<FeedConfig>,
    render: Option<RenderOptions>,
    upload: Option<UploadConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_u32(var: &str, fallback: u32) -> u32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => {
            let trimmed = v.trim();
            match trimmed {
                "1" | "true" | "TRUE" | "yes" | "on" => true,
                "0" | "false" | "FALSE" | "no" | "off" => false,
                _ => fallback,
            }
        }
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_csv(var: &str, fallback: &[String]) -> Vec<String> {
    match env::var(var) {
        Ok(v) => {
            let out = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>();
            if out.is_empty() {
                fallback.to_vec()
            } else {
                out
            }
        }
        Err(_) => fallback.to_vec(),
    }
}

fn validate(cfg: &ArchiveConfig) -> Result<()> {
    if cfg.feed.endpoint.trim().is_empty() {
        return Err(anyhow!("invalid feed endpoint: cannot be empty"));
    }
    if cfg.feed.market.trim().is_empty() {
        return Err(anyhow!("invalid feed market: cannot be empty"));
    }
    if cfg.feed.timeout_secs == 0 {
        return Err(anyhow!("invalid feed timeout: must be >= 1 second"));
    }
    if cfg.render.thumb_width == 0 || cfg.render.thumb_height == 0 {
        return Err(anyhow!("invalid thumbnail size: width and height must be >= 1"));
    }
    if cfg.render.preview_width == 0 {
        return Err(anyhow!("invalid preview width: must be >= 1"));
    }
    if cfg.upload.enabled && cfg.upload.endpoint.trim().is_empty() {
        return Err(anyhow!("upload enabled but no upload endpoint configured"));
    }
    if cfg.upload.enabled && cfg.upload.bucket.trim().is_empty() {
        return Err(anyhow!("upload enabled but no upload bucket configured"));
    }
    Ok(())
}

fn merge_file_config(base: &mut ArchiveConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: PartialArchiveConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse archive config {}: {err}", path.display()))?;
    if let Some(feed) = parsed.feed {
        base.feed = feed;
    }
    if let Some(render) = parsed.render {
        base.render = render;
    }
    if let Some(upload) = parsed.upload {
        base.upload = upload;
    }
    Ok(())
}

/// Defaults, then the TOML file at `config_path`, then `WALLPAPER_*`
/// environment overrides.
pub fn load_config(config_path: &Path) -> Result<ArchiveConfig> {
    let mut cfg = ArchiveConfig::default();
    merge_file_config(&mut cfg, config_path)?;

    cfg.feed.endpoint = env_or_string("WALLPAPER_FEED_ENDPOINT", &cfg.feed.endpoint);
    cfg.feed.market = env_or_string("WALLPAPER_FEED_MARKET", &cfg.feed.market);
    cfg.feed.image_host = env_or_string("WALLPAPER_FEED_IMAGE_HOST", &cfg.feed.image_host);
    cfg.feed.timeout_secs = env_or_u64("WALLPAPER_FEED_TIMEOUT_SECS", cfg.feed.timeout_secs);
    cfg.render.gallery_title = env_or_string("WALLPAPER_GALLERY_TITLE", &cfg.render.gallery_title);
    cfg.render.index_title = env_or_string("WALLPAPER_INDEX_TITLE", &cfg.render.index_title);
    cfg.render.preview_width = env_or_u32("WALLPAPER_PREVIEW_WIDTH", cfg.render.preview_width);
    cfg.render.preview_hosts = env_or_csv("WALLPAPER_PREVIEW_HOSTS", &cfg.render.preview_hosts);
    cfg.upload.enabled = env_or_bool("WALLPAPER_UPLOAD_ENABLED", cfg.upload.enabled);
    cfg.upload.endpoint = env_or_string("WALLPAPER_UPLOAD_ENDPOINT", &cfg.upload.endpoint);
    cfg.upload.bucket = env_or_string("WALLPAPER_UPLOAD_BUCKET", &cfg.upload.bucket);
    cfg.upload.timeout_secs = env_or_u64("WALLPAPER_UPLOAD_TIMEOUT_SECS", cfg.upload.timeout_secs);

    validate(&cfg)?;
    Ok(cfg)
}
