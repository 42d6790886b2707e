use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn snapstat(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_snapstat"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

const BENCH_INPUT: &str = "\
Version,Construct,Form,Proof,Verify,Files,Extra
v1,1,2,3,4,10,x
v1,3,4,5,6,10,x
v2,5,6,7,8,12,x
";

#[test]
fn bench_finds_input_by_pattern_and_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Algorithm_benchmark_run.csv"), BENCH_INPUT).unwrap();

    let output = snapstat(dir.path(), &["bench"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let csv = fs::read_to_string(dir.path().join("Algorithm_benchmark_CI_output.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "\"Version\",\"Construct leaves (ms)\",\"CI Construct leaves (ms)\",\
         \"Form tree (ms)\",\"CI Form tree (ms)\",\"Generate proof (ms)\",\
         \"CI Generate proof (ms)\",\"Verify proof (ms)\",\"CI Verify proof (ms)\",\
         \"Number of files\",\"CI Number of files\","
    );
    // v2 is a trailing single-sample version and is dropped by default.
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("\"v1\",\"2.0\","), "{}", lines[1]);
    assert!(lines[1].ends_with("\"10.0\",\"0.0\","), "{}", lines[1]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Successfully wrote to"), "{stderr}");
}

#[test]
fn bench_rerun_ignores_its_own_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Algorithm_benchmark_run.csv"), BENCH_INPUT).unwrap();

    let first = snapstat(dir.path(), &["bench"]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    let second = snapstat(dir.path(), &["bench"]);
    assert!(second.status.success(), "{}", String::from_utf8_lossy(&second.stderr));
}

#[test]
fn bench_json_includes_trailing_singleton_on_request() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("runs.csv"), BENCH_INPUT).unwrap();

    let output = snapstat(
        dir.path(),
        &[
            "bench",
            "--input",
            "runs.csv",
            "--output",
            "out.csv",
            "--emit-trailing-singleton",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["key"], "v1");
    assert_eq!(rows[0]["samples"], 2);
    assert_eq!(rows[1]["key"], "v2");
    assert!(rows[1]["columns"][0]["ci"].is_null());

    let csv = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert!(csv.lines().nth(2).unwrap().contains("\"N/A\""));
}

#[test]
fn bench_without_matching_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = snapstat(dir.path(), &["bench"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No files were found"));
    assert!(!dir.path().join("Algorithm_benchmark_CI_output.csv").exists());
}

#[test]
fn bench_with_several_candidates_asks_for_input() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Algorithm_benchmark_1.csv"), BENCH_INPUT).unwrap();
    fs::write(dir.path().join("Algorithm_benchmark_2.csv"), BENCH_INPUT).unwrap();
    let output = snapstat(dir.path(), &["bench"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--input"));
}

#[test]
fn bench_rejects_invalid_confidence() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("runs.csv"), BENCH_INPUT).unwrap();
    let output = snapstat(dir.path(), &["bench", "--input", "runs.csv", "--confidence", "1.5"]);
    assert!(!output.status.success());
}

#[test]
fn bench_reads_settings_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".snapstat.toml"),
        "[bench]\ncolumns = [\"Time\"]\noutput = \"summary.csv\"\nversion_pattern = \"^(v[0-9]+)\"\nversion_prefix = \"release-\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("runs.csv"), "h,t\nv1,1\nv1,3\nv2,5\nv2,5\n").unwrap();

    let output = snapstat(dir.path(), &["bench", "--input", "runs.csv"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let csv = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "\"Version\",\"Time\",\"CI Time\",");
    assert!(lines[1].starts_with("\"release-v1\",\"2.0\","));
    assert_eq!(lines[2], "\"release-v2\",\"5.0\",\"0.0\",");
}

#[test]
fn dirs_without_matches_reports_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = snapstat(dir.path(), &["dirs", "--pattern", "release_*"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No directories were found"));
    assert!(!dir.path().join("logDirectoryOutput.csv").exists());
}

#[test]
fn dirs_compares_consecutive_snapshots() {
    if !git_available() {
        eprintln!("git not found; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("snaps");
    fs::create_dir_all(root.join("release_1_zzz/src")).unwrap();
    fs::write(root.join("release_1_zzz/src/main.c"), "a\n").unwrap();
    fs::create_dir_all(root.join("release_2/src")).unwrap();
    fs::write(root.join("release_2/src/main.c"), "a\nb\n").unwrap();
    fs::write(root.join("release_2/NOTES"), "n\n").unwrap();

    let output = snapstat(
        dir.path(),
        &["dirs", "--root", "snaps", "--pattern", "release_*", "--output", "dirs.csv"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("List of directories:"), "{stdout}");

    let csv = fs::read_to_string(dir.path().join("dirs.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("\"Version\",\"Num all files\","));
    assert!(lines[1].starts_with("\"release_1\",\"1\",\"2\","), "{}", lines[1]);
    assert!(lines[1].contains("\"N/A\""));

    let second: Vec<&str> = lines[2]
        .trim_end_matches(',')
        .split(',')
        .map(|f| f.trim_matches('"'))
        .collect();
    assert_eq!(lines[2].matches("\",").count(), 21, "{}", lines[2]);
    assert_eq!(second[0], "release_2");
    assert_eq!(second[1], "2");
    // main.c gained a line; NOTES is new.
    assert_eq!(second[6], "2");
    assert_eq!(second[8], "2");
    assert_eq!(second[9], "1.0");
    assert_eq!(second[13], "1");
    assert_eq!(second[15], "1");
}
