use predicates::prelude::*;

#[test]
fn pdf2epub_without_input_prints_usage() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pdf2epub");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn pdf2epub_reports_unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pdf2epub");
    cmd.current_dir(dir.path())
        .args(["missing.pdf", "out.epub"])
        .assert()
        .failure();
    assert!(!dir.path().join("out.epub").exists());
}

#[test]
fn non_interactive_foreign_url_exits_with_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("storyscrape");
    cmd.current_dir(dir.path())
        .args(["https://example.com/s/story", "--non-interactive"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid or unreachable story URL"))
        .stderr(predicate::str::contains("storyscrape.log"));
    assert!(dir.path().join("storyscrape.log").is_file());
}

#[test]
fn unknown_format_is_rejected() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("storyscrape");
    cmd.args(["--format", "docx", "--non-interactive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --format value"));
}
