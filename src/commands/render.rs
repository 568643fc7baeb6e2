use anyhow::Result;

use crate::archive::config::load_config;
use crate::archive::paths::resolve_paths;
use crate::archive::publish;
use crate::commands::{CommandReport, close_store, open_store, parse_months};

#[derive(Debug, Clone, Default)]
pub struct RenderCommandOptions {
    pub months: Vec<String>,
}

pub fn run(opts: &RenderCommandOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config(&paths.config_file)?;
    let mut report = CommandReport::new("render");

    report.detail(format!("month_dir={}", paths.month_dir.display()));
    report.detail(format!("markdown_dir={}", paths.markdown_dir.display()));
    report.detail(format!("index_file={}", paths.index_file.display()));

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
    report.detail(format!("months={}", months.len()));

    let galleries = publish::publish_galleries(&store, &paths, &cfg.render, &months);
    report.absorb_batch(&paths, "gallery", &galleries);
    let index = publish::publish_index(&store, &paths, &cfg.render);
    report.absorb_batch(&paths, "index", &index);

    close_store(store, &mut report);
    Ok(report)
}
