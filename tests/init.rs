use std::path::Path;
use std::process::{Command, Output};

use snapstat_core::SnapstatConfig;

fn snapstat(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_snapstat"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn init_template_matches_built_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let output = snapstat(dir.path(), &["init"]);
    assert!(output.status.success(), "snapstat init failed: {}", String::from_utf8_lossy(&output.stderr));

    let content = std::fs::read_to_string(dir.path().join(".snapstat.toml")).unwrap();
    let config: SnapstatConfig = toml::from_str(&content).unwrap();
    config.validate().unwrap();

    assert_eq!(config.bench.input_pattern, "Algorithm_benchmark_*.csv");
    assert_eq!(config.bench.confidence, 0.95);
    assert_eq!(
        config.bench.columns,
        vec![
            "Construct leaves (ms)",
            "Form tree (ms)",
            "Generate proof (ms)",
            "Verify proof (ms)",
            "Number of files"
        ]
    );
    assert!(!config.bench.emit_trailing_singleton);
    assert_eq!(config.dirs.sort_suffix.as_deref(), Some("_zzz"));
    assert_eq!(
        config.dirs.code_extensions,
        vec!["cpp", "py", "c", "h", "sh", "go", "js", "java"]
    );
    assert_eq!(config.dirs.output, Path::new("logDirectoryOutput.csv"));
    assert_eq!(config.diff.program, "git");
}

#[test]
fn bench_after_init_writes_paired_ci_header() {
    let dir = tempfile::tempdir().unwrap();
    assert!(snapstat(dir.path(), &["init"]).status.success());
    std::fs::write(
        dir.path().join("Algorithm_benchmark_run.csv"),
        "version,a,b,c,d,e\nv1,1,2,3,4,10\nv1,3,4,5,6,12\n",
    )
    .unwrap();

    let output = snapstat(dir.path(), &["bench"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let csv = std::fs::read_to_string(dir.path().join("Algorithm_benchmark_CI_output.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(
            "\"Version\",\"Construct leaves (ms)\",\"CI Construct leaves (ms)\",\
             \"Form tree (ms)\",\"CI Form tree (ms)\",\"Generate proof (ms)\",\
             \"CI Generate proof (ms)\",\"Verify proof (ms)\",\"CI Verify proof (ms)\",\
             \"Number of files\",\"CI Number of files\","
        )
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("\"v1\",\"2.0\","), "{row}");
    assert_eq!(lines.next(), None);
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".snapstat.toml"), "# existing").unwrap();

    let output = snapstat(dir.path(), &["init"]);
    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".snapstat.toml")).unwrap();
    assert_eq!(content, "# existing");
}
