use std::{
    io::Write,
    process::{Command, Output, Stdio},
};
use tempfile::NamedTempFile;

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_lox-lang")
}

fn script(source: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".lox")
        .tempfile()
        .expect("failed to create temp script");
    file.write_all(source.as_bytes())
        .expect("failed to write temp script");
    file
}

fn lox(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("LOX_MAX_CALL_DEPTH")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run lox-lang")
}

fn run_script(source: &str) -> Output {
    let file = script(source);
    let path = file.path().to_string_lossy().into_owned();
    lox(&["run", &path])
}

#[test]
fn run_prints_program_output() {
    let output = run_script("class Greeter { greet(who) { print \"hello \" + who; } }\nGreeter().greet(\"lox\");");
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello lox\n");
}

#[test]
fn exit_codes_follow_error_kinds() {
    assert_eq!(run_script("print (;").status.code(), Some(65));
    assert_eq!(run_script("var a = a;").status.code(), Some(65));
    assert_eq!(run_script("print 1 / 0;").status.code(), Some(70));
    assert_eq!(run_script("fun f() { f(); } f();").status.code(), Some(71));
}

#[test]
fn deep_nesting_is_reported_not_crashed_on() {
    let output = run_script(&format!("print {}true;", "!".repeat(50_000)));
    assert_eq!(output.status.code(), Some(65));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Too much nesting."));
}

#[test]
fn runtime_errors_report_the_line() {
    let output = run_script("print 1;\nprint nope;");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Undefined variable 'nope'."),
        "missing message:\n{stderr}"
    );
    assert!(stderr.contains("[line 2]"), "missing line:\n{stderr}");
}

#[test]
fn call_depth_is_configurable() {
    let file = script("fun down(n) { if (n > 0) down(n - 1); }\ndown(50);\nprint \"ok\";");
    let path = file.path().to_string_lossy().into_owned();
    let output = Command::new(bin_path())
        .args(["run", &path])
        .env("LOX_MAX_CALL_DEPTH", "10")
        .output()
        .expect("failed to run lox-lang");
    assert_eq!(output.status.code(), Some(71));

    let output = Command::new(bin_path())
        .args(["run", &path])
        .env("LOX_MAX_CALL_DEPTH", "many")
        .output()
        .expect("failed to run lox-lang");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn tokens_and_ast_dump_the_front_end() {
    let file = script("print 1 + 2;");
    let path = file.path().to_string_lossy().into_owned();

    let tokens = lox(&["tokens", &path]);
    assert!(tokens.status.success());
    let tokens = String::from_utf8_lossy(&tokens.stdout);
    assert!(tokens.starts_with("Print print null\n"), "unexpected dump:\n{tokens}");
    assert!(tokens.trim_end().ends_with("Eof  null"), "unexpected dump:\n{tokens}");

    let ast = lox(&["ast", &path]);
    assert!(ast.status.success());
    assert_eq!(String::from_utf8_lossy(&ast.stdout), "(print (+ 1 2))\n");
}

#[test]
fn usage_and_missing_files() {
    assert_eq!(lox(&["frobnicate", "x.lox"]).status.code(), Some(64));
    assert_eq!(lox(&["run", "a.lox", "b.lox"]).status.code(), Some(64));
    assert_eq!(lox(&["run", "/definitely/not/here.lox"]).status.code(), Some(66));
}

#[test]
fn repl_keeps_globals_between_lines() {
    let mut child = Command::new(bin_path())
        .arg("repl")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start repl");
    child
        .stdin
        .as_mut()
        .expect("repl stdin missing")
        .write_all(b"var a = 20;\nprint nope;\nprint a + 1;\n")
        .expect("failed to write repl input");
    let output = child.wait_with_output().expect("failed to wait for repl");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("21\n"), "missing result:\n{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Undefined variable 'nope'."), "stderr:\n{stderr}");
}
