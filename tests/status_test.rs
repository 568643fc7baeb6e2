use std::fs;
use tempfile::tempdir;

#[test]
fn status_reports_paths_and_months_as_json() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path();
    fs::create_dir_all(home.join("month")).expect("mkdir month");
    fs::write(home.join("month/202412.json"), "{}\n").expect("unit");
    fs::write(home.join("month/202501.json"), "{}\n").expect("unit");

    let output = assert_cmd::cargo::cargo_bin_cmd!("wallpaper-archive")
        .current_dir(home)
        .env("WALLPAPER_HOME", home)
        .args(["status", "--json"])
        .output()
        .expect("run status");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["command"], "status");
    assert_eq!(report["ok"], true);
    let details = report["details"]
        .as_array()
        .expect("details")
        .iter()
        .filter_map(|v| v.as_str())
        .collect::<Vec<_>>();
    assert!(details.contains(&"months=2"));
    assert!(details.contains(&"latest_month=202501"));
    assert!(details.contains(&"env.WALLPAPER_HOME=set"));
}
