use std::process::Command;

#[test]
fn help_describes_the_program() {
    let output = Command::new(env!("CARGO_BIN_EXE_hello-triangle"))
        .arg("--help")
        .output()
        .expect("failed to run hello-triangle --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("render one static triangle"));
}

#[test]
fn unknown_arguments_are_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_hello-triangle"))
        .arg("--fullscreen")
        .output()
        .expect("failed to run hello-triangle --fullscreen");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[cfg(target_os = "linux")]
#[test]
fn missing_display_server_fails_before_any_window_exists() {
    let output = Command::new(env!("CARGO_BIN_EXE_hello-triangle"))
        .env_remove("DISPLAY")
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("WAYLAND_SOCKET")
        .output()
        .expect("failed to run hello-triangle");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("could not start the windowing system"),
        "unexpected stderr: {stderr}"
    );
    assert!(output.stdout.is_empty());
}
