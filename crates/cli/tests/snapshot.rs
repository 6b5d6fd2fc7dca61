use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn test_cli_run_writes_snapshot() {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let snapshot_path =
        std::env::temp_dir().join(format!("thermodma-run-snapshot-{}.json", nonce));
    let _ = std::fs::remove_file(&snapshot_path);

    let output = Command::new(env!("CARGO_BIN_EXE_thermodma"))
        .args([
            "run",
            "--cycles",
            "1",
            "--codes",
            "30,31,32",
            "--snapshot",
            snapshot_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute thermodma");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cycle 1: [30, 31, 32]"), "{}", stdout);
    assert!(snapshot_path.exists());

    let snapshot_content = std::fs::read_to_string(&snapshot_path).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&snapshot_content).unwrap();
    assert_eq!(snapshot["ring"]["stage"], "idle");
    assert_eq!(snapshot["ring"]["cycles"], 1);

    let buffer = snapshot["buffer"].as_array().unwrap();
    assert_eq!(buffer.len(), 3);
    assert_eq!(snapshot["transmitted"][2], 32);

    let _ = std::fs::remove_file(&snapshot_path);
}

#[test]
fn test_cli_run_rejects_bad_input() {
    let output = Command::new(env!("CARGO_BIN_EXE_thermodma"))
        .args(["run", "--celsius", "900"])
        .output()
        .expect("Failed to execute thermodma");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_info() {
    let output = Command::new(env!("CARGO_BIN_EXE_thermodma"))
        .arg("info")
        .output()
        .expect("Failed to execute thermodma");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MCTLW=0xade1"), "{}", stdout);
    assert!(stdout.contains("CCR0=24900 (3000 ms)"), "{}", stdout);
}
