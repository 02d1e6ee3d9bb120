use std::process::Command;

#[test]
fn prints_version() {
    let exe = env!("CARGO_BIN_EXE_postview");
    let output = Command::new(exe)
        .arg("--version")
        .output()
        .expect("run postview --version");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "stdout was: {}",
        stdout.trim()
    );
}

#[test]
fn prints_help() {
    let exe = env!("CARGO_BIN_EXE_postview");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("run postview --help");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(stdout.contains("postview"));
    assert!(stdout.contains("--version"));
    assert!(stdout.contains("--dump"));
}

#[test]
fn rejects_unknown_flags() {
    let exe = env!("CARGO_BIN_EXE_postview");
    let output = Command::new(exe)
        .arg("--frobnicate")
        .output()
        .expect("run postview --frobnicate");
    assert_eq!(output.status.code(), Some(2));
}
