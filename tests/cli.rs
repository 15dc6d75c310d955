//! Tests for the `razor` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn razor() -> Command {
    Command::cargo_bin("razor").unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_render_with_json_model() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "hello.razor", "Hello @name!\n");
    let model = write(&dir, "model.json", r#"{"name": "World"}"#);

    razor()
        .args(["render", &template, "--model", &model])
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn test_render_with_yaml_model() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "list.razor", "@for x in items:\n    - @x\n");
    let model = write(&dir, "model.yaml", "items:\n  - a\n  - b\n");

    razor()
        .args(["render", &template, "-m", &model])
        .assert()
        .success()
        .stdout("- a\n- b\n");
}

#[test]
fn test_render_with_config_file() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "page.razor", "  <p>\n    hi\n  </p>\n");
    let config = write(&dir, "razor.toml", "[compile]\nignore_whitespace = true\n");

    razor()
        .args(["render", &template, "--config", &config])
        .assert()
        .success()
        .stdout("<p>\nhi\n</p>\n");
}

#[test]
fn test_render_picks_up_project_config() {
    let dir = TempDir::new().unwrap();
    write(&dir, "page.razor", "  <p>\n    hi\n  </p>\n");
    write(&dir, "razor.toml", "[compile]\nignore_whitespace = true\n");

    razor()
        .current_dir(dir.path())
        .args(["render", "page.razor"])
        .assert()
        .success()
        .stdout("<p>\nhi\n</p>\n");
}

#[test]
fn test_render_missing_template() {
    razor()
        .args(["render", "/nonexistent/page.razor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not Found!"));
}

#[test]
fn test_render_compile_error() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "bad.razor", "@(1 + 2\n");

    razor()
        .args(["render", &template])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unterminated expression"));
}

#[test]
fn test_tokens_command() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "t.razor", "Hi @name");

    razor()
        .args(["tokens", &template])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"Expression\""));
}

#[test]
fn test_procedure_command() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "t.razor", "@if x:\n    y\n");

    razor()
        .args(["procedure", &template])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "def template(self, __io, model=None):\n  view = self\n  if x:\n    __io.write(u'y')\n",
        ));
}
