use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn run_with_stdin(output: &Path, stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_invoice-pdf"))
        .arg("--output")
        .arg(output)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn invoice-pdf");

    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for invoice-pdf")
}

#[test]
fn writes_pdf_for_reference_invoice() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("invoice.pdf");

    let result = run_with_stdin(
        &output,
        r#"{"invoiceNumber":"2024/01","currency":"EUR","hours":10,"rate":50,"net":500,"vatPercent":23}"#,
    );

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    let bytes = std::fs::read(&output).expect("output written");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn empty_object_still_succeeds() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("blank.pdf");

    let result = run_with_stdin(&output, "{}");

    assert!(result.status.success());
    assert!(output.is_file());
}

#[test]
fn malformed_json_exits_with_one_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("broken.pdf");

    let result = run_with_stdin(&output, "{\"invoiceNumber\": ");

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.starts_with("Could not read JSON from stdin:"), "stderr: {stderr}");
    assert_eq!(stderr.trim_end().lines().count(), 1);
    assert!(!output.exists());
}

#[test]
fn empty_stdin_is_an_input_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("empty.pdf");

    let result = run_with_stdin(&output, "");

    assert_eq!(result.status.code(), Some(1));
    assert!(!output.exists());
}

#[test]
fn unwritable_output_reports_render_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("no-such-dir").join("invoice.pdf");

    let result = run_with_stdin(&output, "{}");

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Failed to generate PDF:"), "stderr: {stderr}");
    assert!(!output.exists());
}
