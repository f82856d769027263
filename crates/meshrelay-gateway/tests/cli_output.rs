//! The binary keeps stdout for program output and logs on stderr.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::process::Command;

// Default-key position whose payload is cut inside the longitude field; the
// engine logs the type-decode failure at debug.
const TRUNCATED_POSITION: &str = "0a270d0c4b663315ffffffff18082a0b6ddb95351f7f4ccb61c39a35327906003dd6d42d664803780312084c6f6e67466173741a09213333363634623063";

#[test]
fn decode_prints_only_the_event_on_stdout() {
    let out = Command::new(env!("CARGO_BIN_EXE_meshrelay-gateway"))
        .args(["decode", "--hex", TRUNCATED_POSITION])
        .env("RUST_LOG", "debug")
        .output()
        .expect("run meshrelay-gateway");
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout: {stdout:?}");
    let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(v["kind"], "malformed_payload");
    assert_eq!(v["stage"], "type-decode");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("type decode failed"), "stderr: {stderr:?}");
}

#[test]
fn startup_errors_are_logged_to_stderr() {
    let out = Command::new(env!("CARGO_BIN_EXE_meshrelay-gateway"))
        .args(["--config", "/nonexistent/meshrelay.yaml", "serve"])
        .env("RUST_LOG", "info")
        .output()
        .expect("run meshrelay-gateway");
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("BAD_CONFIG"));
}
