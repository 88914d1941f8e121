//! End-to-end tests driving the compiled shell over piped stdio.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run(script: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_psh"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn psh");
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait on psh")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn end_of_input_exits_successfully() {
    let out = run("");
    assert!(out.status.success());
}

#[test]
fn exit_terminates_the_loop() {
    let out = run("exit\necho after\n");
    assert!(out.status.success());
    assert!(!stdout(&out).contains("after"));
}

#[test]
fn exit_ignores_arguments() {
    let out = run("exit now really\n");
    assert!(out.status.success());
}

#[test]
fn single_command_writes_to_the_terminal() {
    let out = run("echo hello\n");
    assert!(out.status.success());
    assert!(stdout(&out).contains("hello\n"));
}

#[test]
fn two_stage_pipeline_carries_output_through() {
    let out = run("echo hello | cat\n");
    assert!(out.status.success());
    assert!(stdout(&out).contains("hello\n"));
}

#[test]
fn three_stage_pipeline_terminates_and_carries_output() {
    let out = run("echo one | cat | cat\n");
    assert!(out.status.success());
    assert!(stdout(&out).contains("one\n"));
}

#[test]
fn redirect_writes_the_file_not_the_terminal() {
    let path = std::env::temp_dir().join(format!("psh-redir-{}.txt", std::process::id()));
    let out = run(&format!("echo hi > {}\n", path.display()));
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hi\n");
    assert!(!stdout(&out).contains("hi"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn pipeline_tail_honors_redirect() {
    let path = std::env::temp_dir().join(format!("psh-tail-{}.txt", std::process::id()));
    let out = run(&format!("echo deep | cat > {}\n", path.display()));
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "deep\n");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn redirect_truncates_an_existing_file() {
    let path = std::env::temp_dir().join(format!("psh-trunc-{}.txt", std::process::id()));
    std::fs::write(&path, "previous contents that are longer\n").unwrap();
    let out = run(&format!("echo fresh > {}\n", path.display()));
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn blank_lines_are_no_ops() {
    let out = run("\n\n   \necho ok\n");
    assert!(out.status.success());
    assert!(stdout(&out).contains("ok\n"));
}

#[test]
fn unknown_command_reports_and_continues() {
    let out = run("definitely-not-a-command-psh\necho survived\n");
    assert!(out.status.success());
    assert!(stderr(&out).contains("command not found"));
    assert!(stdout(&out).contains("survived\n"));
}

#[test]
fn cd_to_missing_directory_reports_and_continues() {
    let out = run("cd /nonexistent-psh-dir\necho still here\n");
    assert!(out.status.success());
    assert!(stderr(&out).contains("cd"));
    assert!(stdout(&out).contains("still here\n"));
}

#[test]
fn cd_without_argument_reports_and_continues() {
    let out = run("cd\necho fine\n");
    assert!(out.status.success());
    assert!(stderr(&out).contains("expected argument"));
    assert!(stdout(&out).contains("fine\n"));
}

#[test]
fn cd_changes_directory_for_later_commands() {
    let out = run("cd /\npwd\n");
    assert!(out.status.success());
    assert!(stdout(&out).lines().any(|l| l == "/"));
}

#[test]
fn redirect_on_non_last_stage_is_rejected() {
    let out = run("echo hi > somewhere | cat\necho still\n");
    assert!(out.status.success());
    assert!(stderr(&out).contains("last pipeline stage"));
    assert!(stdout(&out).contains("still\n"));
}

#[test]
fn unopenable_redirect_target_aborts_only_that_line() {
    let out = run("echo hi > /nonexistent-dir/psh-out\necho next\n");
    assert!(out.status.success());
    assert!(!stderr(&out).is_empty());
    assert!(stdout(&out).contains("next\n"));
}

#[test]
fn failing_stage_does_not_stop_the_loop() {
    let out = run("false\necho alive\n");
    assert!(out.status.success());
    assert!(stdout(&out).contains("alive\n"));
}
