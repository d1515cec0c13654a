use std::process::Command;

#[test]
fn test_psearch_version() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "psearch", "--", "--version"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_psearch_help() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "psearch", "--", "--help"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("search"));
    assert!(stdout.contains("quick"));
    assert!(stdout.contains("init"));
}

#[test]
fn test_psearch_init_refuses_overwrite() {
    let dir = std::env::temp_dir().join("psearch-init-test");
    let path = dir.join("psearch.toml");
    let _ = std::fs::remove_file(&path);

    let run = |expect_success: bool| {
        let output = Command::new("cargo")
            .args(["run", "--bin", "psearch", "--", "init"])
            .arg(&path)
            .output()
            .unwrap();
        assert_eq!(output.status.success(), expect_success);
    };

    run(true);
    assert!(path.exists());
    run(false);

    let _ = std::fs::remove_file(&path);
}
