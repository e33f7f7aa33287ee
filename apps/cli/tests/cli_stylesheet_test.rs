//! Integration tests for the `partials-cli add-mobile-css` command.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PAGE: &str = "<head>\n    <link rel=\"stylesheet\" href=\"assets/css/cleenhearts.css\" />\n</head>";

fn add_mobile_css(temp_dir: &TempDir) -> assert_cmd::assert::Assert {
    fs::write(temp_dir.path().join("partials.toml"), "").unwrap();
    let mut cmd = Command::cargo_bin("partials-cli").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("--config")
        .arg("partials.toml")
        .arg("add-mobile-css")
        .assert()
}

#[test]
fn test_add_mobile_css_inserts_link() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("index.html"), PAGE).unwrap();

    add_mobile_css(&temp_dir)
        .success()
        .stdout(predicate::str::contains("Added mobile CSS to index.html"));

    let updated = fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    assert!(updated.contains("<!-- mobile navigation fixes -->"));
    assert!(updated.contains(r#"<link rel="stylesheet" href="assets/css/mobile-nav-fix.css" />"#));
}

#[test]
fn test_add_mobile_css_second_run_reports_present() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("index.html"), PAGE).unwrap();

    add_mobile_css(&temp_dir).success();
    add_mobile_css(&temp_dir)
        .success()
        .stdout(predicate::str::contains("index.html already has mobile CSS"));
}

#[test]
fn test_add_mobile_css_skips_create_pages_and_missing_anchor() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("create-page.html"), PAGE).unwrap();
    fs::write(temp_dir.path().join("gallery.html"), "<head></head>").unwrap();

    add_mobile_css(&temp_dir)
        .success()
        .stdout(predicate::str::contains("Could not find CSS insertion point in gallery.html"))
        .stdout(predicate::str::contains("create-page.html").not());

    assert_eq!(fs::read_to_string(temp_dir.path().join("create-page.html")).unwrap(), PAGE);
}
