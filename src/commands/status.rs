use anyhow::Result;
use std::env;

use crate::archive::config::load_config;
use crate::archive::paths::resolve_paths;
use crate::archive::store::AggregateStore;
use crate::commands::CommandReport;

include!(concat!(env!("OUT_DIR"), "/archive_env_allowlist.rs"));

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("archive_home={}", paths.archive_home.display()));
    report.detail(format!("month_dir={}", paths.month_dir.display()));
    report.detail(format!("legacy_dir={}", paths.legacy_dir.display()));
    report.detail(format!("markdown_dir={}", paths.markdown_dir.display()));
    report.detail(format!("index_file={}", paths.index_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!("config_file={}", paths.config_file.display()));

    match load_config(&paths.config_file) {
        Ok(cfg) => {
            report.detail(format!("feed.endpoint={}", cfg.feed.endpoint));
            report.detail(format!("feed.market={}", cfg.feed.market));
            report.detail(format!("upload.enabled={}", cfg.upload.enabled));
        }
        Err(err) => report.issue(format!("config invalid: {err:#}")),
    }

    for key in GENERATED_ARCHIVE_ENV_ALLOWLIST {
        if env::var_os(key).is_some() {
            report.detail(format!("env.{key}=set"));
        }
    }

    if !paths.month_dir.exists() {
        report.detail("month dir missing (created on first fetch or migrate)");
        return Ok(report);
    }

    match AggregateStore::open(&paths.month_dir) {
        Ok(store) => {
            match store.list_month_keys() {
                Ok(months) => {
                    report.detail(format!("months={}", months.len()));
                    if let Some(latest) = months.last() {
                        report.detail(format!("latest_month={latest}"));
                    }
                }
                Err(err) => report.issue(format!("{} {err}", err.code().as_str())),
            }
            if let Err(err) = store.close() {
                report.warning(format!("failed to release store lock: {err}"));
            }
        }
        Err(err) => report.issue(format!("{} {err}", err.code().as_str())),
    }

    Ok(report)
}
