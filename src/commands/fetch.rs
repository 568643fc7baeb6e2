use anyhow::Result;
use std::path::PathBuf;

use crate::archive::config::load_config;
use crate::archive::feed::{BingFeed, DailyFeed, FileFeed};
use crate::archive::paths::resolve_paths;
use crate::archive::publish;
use crate::archive::report::BatchReport;
use crate::archive::upload::{HttpUploader, Uploader};
use crate::commands::{CommandReport, close_store, open_store};
use crate::error::ArchiveErrorCode;

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub input: Option<PathBuf>,
    pub market: Option<String>,
    pub render: bool,
    pub upload: bool,
}

pub fn run(opts: &FetchOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut cfg = load_config(&paths.config_file)?;
    if let Some(market) = opts.market.as_deref().filter(|m| !m.trim().is_empty()) {
        cfg.feed.market = market.trim().to_string();
    }
    let mut report = CommandReport::new("fetch");

    let feed: Box<dyn DailyFeed> = match &opts.input {
        Some(path) => Box::new(FileFeed {
            path: path.clone(),
            image_host: cfg.feed.image_host.clone(),
        }),
        None => Box::new(BingFeed::from_config(&cfg.feed)),
    };
    report.detail(format!("feed={}", feed.name()));
    report.detail(format!("market={}", cfg.feed.market));

    let pull = match feed.pull() {
        Ok(pull) => pull,
        Err(err) => {
            report.issue(format!(
                "{} feed pull failed: {err:#}",
                ArchiveErrorCode::E005FeedFailed.as_str()
            ));
            return Ok(report);
        }
    };
    report.detail(format!("feed.records={}", pull.records.len()));
    report.absorb_batch(
        &paths,
        "feed",
        &BatchReport {
            units: pull.rejected,
        },
    );

    let Some(store) = open_store(&paths, &mut report) else {
        return Ok(report);
    };
    report.detail(format!("month_dir={}", store.month_dir().display()));

    let uploader = if opts.upload {
        HttpUploader::from_config(&cfg.upload)
    } else {
        None
    };
    match &uploader {
        Some(u) => report.detail(format!("uploader={}", u.name())),
        None => report.detail("uploader=disabled"),
    }

    let outcome = publish::ingest(
        &store,
        pull.records,
        uploader.as_ref().map(|u| u as &dyn Uploader),
    );
    report.absorb_batch(&paths, "merge", &outcome.report);
    for (month, days) in &outcome.month_sizes {
        report.detail(format!("month.{month}.days={days}"));
    }

    if opts.render {
        if outcome.touched.is_empty() {
            report.detail("render: no month changed");
        } else {
            let galleries =
                publish::publish_galleries(&store, &paths, &cfg.render, &outcome.touched);
            report.absorb_batch(&paths, "gallery", &galleries);
            let index = publish::publish_index(&store, &paths, &cfg.render);
            report.absorb_batch(&paths, "index", &index);
        }
    }

    close_store(store, &mut report);
    Ok(report)
}
