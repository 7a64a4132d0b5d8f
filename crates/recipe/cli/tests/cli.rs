//! End-to-end tests for the `recipe` binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::io::Write;
use std::time::Duration;

// ---- Helpers ----

fn recipe_cmd() -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("recipe");
    cmd.timeout(Duration::from_secs(15));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn recipe_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create recipe file");
    file.write_all(contents.as_bytes()).expect("write recipe");
    file
}

const GREETING_RECIPE: &str = r#"{
  "name": "greeting",
  "modules": [
    {"name": "ReportPrinter", "wants": ["ReportEmitter"]},
    {"name": "ReportEmitter", "args": {"text": "hello @who"}}
  ]
}"#;

// ---- Tests ----

#[test]
fn test_modules_lists_builtins() {
    recipe_cmd()
        .arg("modules")
        .assert()
        .success()
        .stdout(contains("ReportEmitter").and(contains("ReportPrinter")));
}

#[test]
fn test_run_prints_report_after_its_producer() {
    let file = recipe_file(".json", GREETING_RECIPE);
    recipe_cmd()
        .args(["run", file.path().to_str().expect("utf8 path")])
        .args(["-p", "who=world"])
        .assert()
        .success()
        .stdout(contains("== ReportEmitter ==").and(contains("hello world")));
}

#[test]
fn test_run_yaml_recipe() {
    let file = recipe_file(
        ".yaml",
        "name: greeting\nmodules:\n  - name: ReportEmitter\n    args:\n      text: from yaml\n  - name: ReportPrinter\n    wants: [ReportEmitter]\n",
    );
    recipe_cmd()
        .args(["run", file.path().to_str().expect("utf8 path")])
        .assert()
        .success()
        .stdout(contains("from yaml"));
}

#[test]
fn test_parameters_from_config_file() {
    let recipe = recipe_file(".json", GREETING_RECIPE);
    let config = recipe_file(".toml", "[parameters]\nwho = \"config\"\n");
    recipe_cmd()
        .args(["--config", config.path().to_str().expect("utf8 path")])
        .args(["run", recipe.path().to_str().expect("utf8 path")])
        .assert()
        .success()
        .stdout(contains("hello config"));
}

#[test]
fn test_missing_argument_aborts_after_setup() {
    let file = recipe_file(
        ".json",
        r#"{"name": "broken", "modules": [{"name": "ReportEmitter"}]}"#,
    );
    recipe_cmd()
        .args(["run", file.path().to_str().expect("utf8 path")])
        .assert()
        .code(1)
        .stderr(
            contains("Encountered one or more errors")
                .and(contains("CRITICAL"))
                .and(contains("text"))
                .and(contains("Critical error found. Aborting.")),
        );
}

#[test]
fn test_unknown_module_is_rejected() {
    let file = recipe_file(
        ".json",
        r#"{"name": "bad", "modules": [{"name": "NoSuchModule"}]}"#,
    );
    recipe_cmd()
        .args(["run", file.path().to_str().expect("utf8 path")])
        .assert()
        .code(2)
        .stderr(contains("Recipe uses unknown module: NoSuchModule"));
}

#[test]
fn test_warning_does_not_fail_run() {
    let file = recipe_file(
        ".json",
        r#"{"name": "quiet", "modules": [{"name": "ReportPrinter"}]}"#,
    );
    recipe_cmd()
        .args(["run", file.path().to_str().expect("utf8 path")])
        .assert()
        .success()
        .stderr(contains("No reports to print"));
}

#[test]
fn test_malformed_param_is_a_usage_error() {
    let file = recipe_file(".json", GREETING_RECIPE);
    recipe_cmd()
        .args(["run", file.path().to_str().expect("utf8 path")])
        .args(["-p", "novalue"])
        .assert()
        .failure()
        .stderr(contains("KEY=VALUE"));
}
