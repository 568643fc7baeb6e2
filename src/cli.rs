use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::fetch::{self, FetchOptions};
use crate::commands::migrate::{self, MigrateOptions};
use crate::commands::render::{self, RenderCommandOptions};
use crate::commands::upload::{self, UploadOptions};
use crate::commands::{CommandReport, status};

#[derive(Debug, Parser)]
#[command(name = "wallpaper-archive")]
#[command(about = "Archive a daily wallpaper feed into monthly units and publish gallery pages")]
#[command(version)]
struct Cli {
    /// Print the command report as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pull the daily feed and merge it into the monthly units
    Fetch {
        /// Replay a saved feed payload instead of calling the API
        #[arg(long)]
        input: Option<PathBuf>,
        /// Feed market, e.g. zh-CN or en-US
        #[arg(long)]
        market: Option<String>,
        /// Skip regenerating gallery pages and the index
        #[arg(long)]
        no_render: bool,
        /// Skip uploading changed months. Months whose upload failed are
        /// not retried by later fetches; use `upload` for that
        #[arg(long)]
        no_upload: bool,
    },
    /// Regenerate gallery pages (all months, or the given ones) and the index
    Render {
        /// Month to render as YYYYMM; repeatable
        #[arg(long = "month")]
        months: Vec<String>,
    },
    /// Fold the legacy per-day layout into monthly units
    Migrate {
        /// Directory of YYYYMMDD.json files (defaults to <home>/date)
        #[arg(long)]
        legacy_dir: Option<PathBuf>,
    },
    /// Upload monthly units to remote storage (all months, or the given ones)
    Upload {
        /// Month to upload as YYYYMM; repeatable
        #[arg(long = "month")]
        months: Vec<String>,
    },
    /// Show resolved paths, configuration and store contents
    Status,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{}: {}", report.command, if report.ok { "ok" } else { "failed" });
    for detail in &report.details {
        println!("  {detail}");
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    Ok(())
}

/// Parse arguments, run the command and print its report. Returns whether
/// the command finished without issues.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Fetch {
            input,
            market,
            no_render,
            no_upload,
        } => fetch::run(&FetchOptions {
            input,
            market,
            render: !no_render,
            upload: !no_upload,
        })?,
        Command::Render { months } => render::run(&RenderCommandOptions { months })?,
        Command::Migrate { legacy_dir } => migrate::run(&MigrateOptions { legacy_dir })?,
        Command::Upload { months } => upload::run(&UploadOptions { months })?,
        Command::Status => status::run()?,
    };

    print_report(&report, cli.json)?;
    Ok(report.ok)
}
