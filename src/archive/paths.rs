use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ArchivePaths {
    pub archive_home: PathBuf,
    pub month_dir: PathBuf,
    pub legacy_dir: PathBuf,
    pub markdown_dir: PathBuf,
    pub index_file: PathBuf,
    pub logs_dir: PathBuf,
    pub config_file: PathBuf,
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<ArchivePaths> {
    let cwd = env::current_dir().context("current directory could not be resolved")?;
    let archive_home = env_or_default_path("WALLPAPER_HOME", cwd);
    Ok(paths_under(archive_home))
}

pub fn paths_under(archive_home: PathBuf) -> ArchivePaths {
    let month_dir = env_or_default_path("WALLPAPER_MONTH_DIR", archive_home.join("month"));
    let legacy_dir = env_or_default_path("WALLPAPER_LEGACY_DIR", archive_home.join("date"));
    let markdown_dir = env_or_default_path("WALLPAPER_MARKDOWN_DIR", archive_home.join("markdown"));
    let index_file = env_or_default_path("WALLPAPER_INDEX_FILE", archive_home.join("README.md"));
    let logs_dir = env_or_default_path("WALLPAPER_LOGS_DIR", archive_home.join("logs"));
    let config_file =
        env_or_default_path("WALLPAPER_CONFIG_PATH", archive_home.join("archive.toml"));

    ArchivePaths {
        archive_home,
        month_dir,
        legacy_dir,
        markdown_dir,
        index_file,
        logs_dir,
        config_file,
    }
}

impl ArchivePaths {
    pub fn gallery_file(&self, month_key: &str) -> PathBuf {
        self.markdown_dir.join(format!("{month_key}.md"))
    }

    /// Link prefix from the index document to the gallery directory.
    ///
    /// Relative when the galleries live below the index file's directory so
    /// the published tree stays portable; absolute otherwise.
    pub fn gallery_link_prefix(&self) -> String {
        let index_dir = self.index_file.parent().unwrap_or(Path::new(""));
        match self.markdown_dir.strip_prefix(index_dir) {
            Ok(rel) if !rel.as_os_str().is_empty() => path_to_link(rel),
            _ => path_to_link(&self.markdown_dir),
        }
    }
}

fn path_to_link(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
        .replace("//", "/")
}

#[cfg(test)]
pub fn test_paths(root: &Path) -> ArchivePaths {
    ArchivePaths {
        archive_home: root.to_path_buf(),
        month_dir: root.join("month"),
        legacy_dir: root.join("date"),
        markdown_dir: root.join("markdown"),
        index_file: root.join("README.md"),
        logs_dir: root.join("logs"),
        config_file: root.join("archive.toml"),
    }
}
