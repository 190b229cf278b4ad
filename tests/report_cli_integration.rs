//! Integration tests for the abtest-report CLI
//!
//! Each test writes a small session log into a temp directory and runs
//! the compiled binary against it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn report_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_abtest-report"))
}

/// Write a session log with the given (group, sessions, conversions) arms
fn write_fixture(dir: &Path, arms: &[(&str, u32, u32)]) -> PathBuf {
    let mut csv = String::from("user_id,timestamp,group,landing_page,converted\n");
    let mut user = 100_000;
    for (group, sessions, conversions) in arms {
        for i in 0..*sessions {
            let day = 2 + i % 5;
            let page = if *group == "control" { "old_page" } else { "new_page" };
            let converted = u8::from(i < *conversions);
            csv.push_str(&format!(
                "{},2017-01-{:02} 12:{:02}:00.000000,{},{},{}\n",
                user,
                day,
                i % 60,
                group,
                page,
                converted
            ));
            user += 1;
        }
    }

    let path = dir.join("ab_data.csv");
    fs::write(&path, csv).expect("Failed to write fixture");
    path
}

fn run_report(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(report_binary())
        .args(args)
        .current_dir(dir.path())
        .env_remove("ABTEST_CONFIG_PATH")
        .env_remove("ABTEST_DATA_PATH")
        .env_remove("ABTEST_ALPHA")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run abtest-report")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_text_report_significant() {
    let dir = TempDir::new().unwrap();
    let data = write_fixture(dir.path(), &[("control", 1000, 100), ("treatment", 1000, 150)]);

    let output = run_report(&dir, &["--data", data.to_str().unwrap(), "--no-color"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.contains("Total Users: 2,000"));
    assert!(text.contains("Total Conversions: 250"));
    assert!(text.contains("Conversion Rate: 12.50%"));
    assert!(text.contains("Z-statistic: -3.3806"));
    assert!(text.contains("Reject the Null Hypothesis"));
    assert!(!text.contains('\x1b'));
}

#[test]
fn test_text_report_not_significant() {
    let dir = TempDir::new().unwrap();
    let data = write_fixture(dir.path(), &[("control", 1000, 100), ("treatment", 1000, 102)]);

    let output = run_report(&dir, &["--data", data.to_str().unwrap(), "--no-color"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Fail to Reject the Null Hypothesis"));
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let data = write_fixture(dir.path(), &[("control", 1000, 100), ("treatment", 1000, 150)]);

    let output = run_report(&dir, &["--data", data.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["metrics"]["total_users"], 2000);
    assert_eq!(json["groups"][0]["group"], "control");
    assert_eq!(json["groups"][1]["conversions"], 150);
    assert_eq!(json["significance"]["status"], "tested");
    assert_eq!(json["significance"]["verdict"], "significant");
    assert!(json["significance"]["p_value"].as_f64().unwrap() < 0.05);
    assert_eq!(json["trend"]["dates"].as_array().unwrap().len(), 5);
    assert_eq!(json["preview"].as_array().unwrap().len(), 5);
}

#[test]
fn test_single_arm_is_informational() {
    let dir = TempDir::new().unwrap();
    let data = write_fixture(dir.path(), &[("control", 50, 5), ("treatment", 50, 9)]);

    let output = run_report(
        &dir,
        &["--data", data.to_str().unwrap(), "--group", "treatment", "--no-color"],
    );
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Z-test requires both control and treatment groups to be present."));
    assert!(text.contains("Total Users: 50"));
    assert!(!text.contains("Z-statistic"));
}

#[test]
fn test_alpha_flag() {
    let dir = TempDir::new().unwrap();
    let data = write_fixture(dir.path(), &[("control", 1000, 100), ("treatment", 1000, 150)]);

    // p ≈ 0.0007, significant at 0.05 but not at 0.0001
    let output = run_report(
        &dir,
        &["--data", data.to_str().unwrap(), "--format", "json", "--alpha", "0.0001"],
    );
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["significance"]["verdict"], "not_significant");

    let output = run_report(&dir, &["--data", data.to_str().unwrap(), "--alpha", "2"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let data = write_fixture(dir.path(), &[("control", 20, 2), ("treatment", 20, 4)]);
    let config = dir.path().join("abtest_config.toml");
    fs::write(
        &config,
        format!(
            "data_path = {:?}\ndefault_filter = \"control\"\n\n[analysis]\npreview_rows = 2\n",
            data.to_str().unwrap()
        ),
    )
    .unwrap();

    let output = run_report(
        &dir,
        &["--config", config.to_str().unwrap(), "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["filter"], "control");
    assert_eq!(json["preview"].as_array().unwrap().len(), 2);
    assert_eq!(json["significance"]["status"], "skipped");
}

#[test]
fn test_missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let output = run_report(&dir, &["--data", "does_not_exist.csv"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does_not_exist.csv"), "stderr: {}", stderr);
}

#[test]
fn test_malformed_row_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(
        &path,
        "user_id,timestamp,group,converted\n1,2017-01-02,control,0\n2,not-a-date,control,1\n",
    )
    .unwrap();

    let output = run_report(&dir, &["--data", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 3"));
}
