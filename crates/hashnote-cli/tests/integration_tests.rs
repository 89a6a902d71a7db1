use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SAMPLE: &str = "function equals(x #number, y #number) #boolean {\n  return x === y\n}\n";

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, contents) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    temp
}

#[test]
fn test_help() {
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.arg("--help");

    cmd.assert().success().stdout(predicate::str::contains("Hash-comment annotation scanner"));
}

#[test]
fn test_scan_lists_payloads() {
    let temp = project(&[("equals.js", SAMPLE)]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).arg("scan").arg("equals.js");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("equals.js"))
        .stdout(predicate::str::contains("boolean"));
}

#[test]
fn test_attach_json() {
    let temp = project(&[("equals.js", SAMPLE)]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).args(["attach", "--format", "json", "equals.js"]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let table = &value[0]["table"];
    assert_eq!(table[0]["target"]["kind"], "parameter");
    assert_eq!(table[0]["target"]["function"], "equals");
    assert_eq!(table[2]["target"]["kind"], "function_return");
    assert_eq!(table[2]["annotations"][0]["node"]["payload"], "boolean");
}

#[test]
fn test_attach_text() {
    let temp = project(&[("equals.js", SAMPLE)]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).args(["attach", "equals.js"]);

    cmd.assert().success().stdout(predicate::str::contains("FunctionReturn(equals)"));
}

#[test]
fn test_check_clean() {
    let temp = project(&[("src/equals.js", SAMPLE)]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).args(["check", "src"]);

    cmd.assert().success().stdout(predicate::str::contains("no problems"));
}

#[test]
fn test_check_reports_malformed_annotation() {
    let temp = project(&[("broken.js", "let a #<b ]>\nlet c #string\n")]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).args(["check", "broken.js"]);

    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("broken.js:1:11"))
        .stdout(predicate::str::contains("Mismatched closing"));
}

#[test]
fn test_check_strict_rejects_fallback() {
    let temp = project(&[("call.js", "run(1 #odd, 2)\n")]);

    let mut lenient = cargo_bin_cmd!("hnote");
    lenient.current_dir(temp.path()).args(["check", "call.js"]);
    lenient.assert().success();

    let mut strict = cargo_bin_cmd!("hnote");
    strict.current_dir(temp.path()).args(["--strict", "check", "call.js"]);
    strict.assert().failure().stdout(predicate::str::contains("Ambiguous attachment"));
}

#[test]
fn test_strip_from_stdin() {
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.args(["strip", "-"]).write_stdin("let x #string = 1\n");

    cmd.assert().success().stdout("let x  = 1\n");
}

#[test]
fn test_strip_keeps_regex_literals() {
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.args(["strip", "-"]).write_stdin("const hex #RegExp = /^#([0-9a-f]{3})$/i\n");

    cmd.assert().success().stdout("const hex  = /^#([0-9a-f]{3})$/i\n");
}

#[test]
fn test_at_preset_from_config_file() {
    let temp = project(&[
        (".hnote.toml", "preset = \"at\"\n"),
        ("total.js", "let total @{ Map<string, number> } = new Map()\n"),
    ]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).args(["attach", "total.js"]);

    cmd.assert().success().stdout(predicate::str::contains("VariableDeclaration(total)"));
}

#[test]
fn test_invalid_config_fails() {
    let temp = project(&[("bad.toml", "max_nesting_depth = 0\n"), ("a.js", "")]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).args(["--config", "bad.toml", "scan", "a.js"]);

    cmd.assert().failure().stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_missing_path_fails() {
    let temp = project(&[]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).args(["scan", "nowhere.js"]);

    cmd.assert().failure().stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_glob_and_yaml() {
    let temp = project(&[("a.js", "let a #A\n"), ("b.js", "let b #B\n"), ("c.ts", "let c #C\n")]);
    let mut cmd = cargo_bin_cmd!("hnote");
    cmd.current_dir(temp.path()).args(["scan", "--format", "yaml", "*.js"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("file: a.js"))
        .stdout(predicate::str::contains("file: b.js"))
        .stdout(predicate::str::contains("c.ts").not());
}
