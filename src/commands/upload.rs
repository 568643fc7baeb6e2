use anyhow::Result;

use crate::archive::config::load_config;
use crate::archive::paths::resolve_paths;
use crate::archive::publish;
use crate::archive::upload::{HttpUploader, Uploader};
use crate::commands::{CommandReport, close_store, open_store, parse_months};

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub months: Vec<String>,
}

pub fn run(opts: &UploadOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config(&paths.config_file)?;
    let mut report = CommandReport::new("upload");

    let Some(uploader) = HttpUploader::from_config(&cfg.upload) else {
        report.issue("uploads are disabled; set upload.enabled and upload.endpoint");
        return Ok(report);
    };
    report.detail(format!("uploader={}", uploader.name()));
    report.detail(format!("bucket={}", uploader.bucket));

    let requested = parse_months(&opts.months, &mut report);
    if !report.ok {
        return Ok(report);
    }

    let Some(store) = open_store(&paths, &mut report) else {
        return Ok(report);
    };
    let months = if requested.is_empty() {
        match store.list_month_keys() {
            Ok(all) => all,
            Err(err) => {
                report.issue(format!("{} {err}", err.code().as_str()));
                close_store(store, &mut report);
                return Ok(report);
            }
        }
    } else {
        requested
    };

    let batch = publish::upload_months(&store, &uploader, &months);
    report.absorb_batch(&paths, "upload", &batch);
    close_store(store, &mut report);

    Ok(report)
}
