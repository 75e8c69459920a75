use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("pv-signal-lab").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn signal_without_input_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("pv-signal-lab").expect("binary exists");
    cmd.current_dir(dir.path())
        .env("DATA_DIR", dir.path().join("data"))
        .env("OUTPUTS_DIR", dir.path().join("outputs"))
        .arg("signal")
        .assert()
        .failure();
    assert!(!dir.path().join("outputs/tables/signals.csv").exists());
}
