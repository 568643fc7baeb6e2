use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_legacy_day(dir: &Path, day: &str, title: &str) {
    fs::create_dir_all(dir).expect("mkdir legacy");
    let date = format!("{}-{}-{}", &day[..4], &day[4..6], &day[6..]);
    let body = serde_json::json!([{
        "date": date,
        "imgtitle": title,
        "imgdesc": "",
        "imgurl": format!("https://cn.bing.com/th?id=OHR.D{day}_UHD.jpg")
    }]);
    fs::write(dir.join(format!("{day}.json")), body.to_string()).expect("write legacy day");
}

#[test]
fn migrate_is_rerunnable_and_render_publishes_pages() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path();
    let legacy = home.join("date");
    write_legacy_day(&legacy, "20250103", "Head  |  Third");
    write_legacy_day(&legacy, "20250101", "Head  |  First");
    write_legacy_day(&legacy, "20250210", "Head  |  February");
    fs::write(legacy.join("broken.json"), "[]").expect("write broken");

    assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(home)
        .env("WALLPAPER_HOME", home)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate: written=2 unchanged=0 skipped=1"))
        .stderr(predicate::str::contains("ARCHIVE_WARN code=E003_INVALID_KEY"));

    let jan = fs::read(home.join("month/202501.json")).expect("jan unit");

    assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(home)
        .env("WALLPAPER_HOME", home)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate: written=0 unchanged=2 skipped=1"));
    assert_eq!(fs::read(home.join("month/202501.json")).expect("jan unit"), jan);

    assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(home)
        .env("WALLPAPER_HOME", home)
        .arg("render")
        .assert()
        .success();

    let gallery = fs::read_to_string(home.join("markdown/202501.md")).expect("gallery");
    assert!(gallery.starts_with("# Bing Wallpapers - January 2025\n"));
    let first = gallery.find("alt=\"First\"").expect("first");
    let third = gallery.find("alt=\"Third\"").expect("third");
    assert!(first < third);

    let readme = fs::read_to_string(home.join("README.md")).expect("readme");
    assert!(readme.contains("## Current Month: February 2025"));
    assert!(readme.contains("**2025**: | [1](markdown/202501.md) | [2](markdown/202502.md)\n"));

    let audit = fs::read_to_string(home.join("logs/audit.log")).expect("audit log");
    assert!(audit.contains("\"status\":\"skipped\""));
}

#[test]
fn render_rejects_malformed_month_flag() {
    let tmp = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(tmp.path())
        .env("WALLPAPER_HOME", tmp.path())
        .args(["render", "--month", "2025-01"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("month key must be exactly 6 ascii digits"));
}

#[test]
fn migrate_without_legacy_dir_fails() {
    let tmp = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(tmp.path())
        .env("WALLPAPER_HOME", tmp.path())
        .arg("migrate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("legacy dir does not exist"));
}

#[test]
fn render_skips_months_without_a_unit() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path();
    write_legacy_day(&home.join("date"), "20250101", "Head  |  First");

    assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(home)
        .env("WALLPAPER_HOME", home)
        .arg("migrate")
        .assert()
        .success();

    assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(home)
        .env("WALLPAPER_HOME", home)
        .args(["render", "--month", "202501", "--month", "202503"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gallery: written=1 unchanged=0 skipped=1"))
        .stdout(predicate::str::contains("warning: E003_INVALID_KEY gallery 202503"));

    assert!(home.join("markdown/202501.md").is_file());
    assert!(!home.join("markdown/202503.md").exists());
}

#[test]
fn render_rejects_month_outside_calendar() {
    let tmp = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(tmp.path())
        .env("WALLPAPER_HOME", tmp.path())
        .args(["render", "--month", "202513"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("month key `202513` names no calendar month"));

    assert!(!tmp.path().join("markdown/202513.md").exists());
}
