use std::process::Command;

/// Runs the interpreter binary with `-e` and returns stdout plus the exit
/// status.
fn eval(code: &str) -> (String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_zelo")).arg("-e")
                                                         .arg(code)
                                                         .output()
                                                         .expect("failed to run zelo");
    (String::from_utf8_lossy(&output.stdout).to_string(),
     output.status.code().unwrap_or(-1))
}

#[test]
fn fibonacci_prints_55() {
    let (stdout, status) = eval("func fib(n) { if n < 2 then return n; \
                                 return fib(n-1) + fib(n-2); } print(fib(10));");
    assert_eq!(stdout, "55\n");
    assert_eq!(status, 0);
}

#[test]
fn class_with_constructor_and_method() {
    let (stdout, status) = eval("class Counter { func __init__() { this.n = 0; } \
                                 func inc() { this.n = this.n + 1; } } \
                                 loc c = Counter(); c.inc(); c.inc(); c.inc(); print(c.n);");
    assert_eq!(stdout, "3\n");
    assert_eq!(status, 0);
}

#[test]
fn operator_overload() {
    let (stdout, status) = eval("class V { func __init__(x) { this.x = x; } \
                                 func __add__(o) { return V(this.x + o.x); } } \
                                 loc r = V(2) + V(3); print(r.x);");
    assert_eq!(stdout, "5\n");
    assert_eq!(status, 0);
}

#[test]
fn closure_capture() {
    let (stdout, status) = eval("func make() { loc n = 0; \
                                 func inc() { n = n + 1; return n; } return inc; } \
                                 loc f = make(); print(f()); print(f()); print(f());");
    assert_eq!(stdout, "1\n2\n3\n");
    assert_eq!(status, 0);
}

#[test]
fn macro_expansion() {
    let (stdout, status) = eval("macro SQR(x) (x) * (x) ; print(SQR(3 + 1));");
    assert_eq!(stdout, "16\n");
    assert_eq!(status, 0);
}

#[test]
fn try_catch() {
    let (stdout, status) = eval("try { throw \"boom\"; } catch (e) { print(\"caught:\" + e); }");
    assert_eq!(stdout, "caught:boom\n");
    assert_eq!(status, 0);
}

#[test]
fn runtime_errors_exit_nonzero() {
    let (_, status) = eval("loc x = 1 / 0;");
    assert_eq!(status, 1);

    let (_, status) = eval("loc x = missing;");
    assert_eq!(status, 1);
}

#[test]
fn check_mode_parses_without_executing() {
    let dir = std::env::temp_dir().join("zelo_cli_tests");
    std::fs::create_dir_all(&dir).unwrap();

    let good = dir.join("good.z");
    std::fs::write(&good, "loc x = 1 / 0;\n").unwrap();

    // Division by zero is a runtime error; a syntax check still passes.
    let output = Command::new(env!("CARGO_BIN_EXE_zelo")).arg("--check")
                                                         .arg(&good)
                                                         .output()
                                                         .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let bad = dir.join("bad.z");
    std::fs::write(&bad, "loc = ;\n").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_zelo")).arg("--check")
                                                         .arg(&bad)
                                                         .output()
                                                         .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn run_file_and_missing_file() {
    let dir = std::env::temp_dir().join("zelo_cli_tests");
    std::fs::create_dir_all(&dir).unwrap();

    let script = dir.join("script.z");
    std::fs::write(&script, "print(\"hello from a file\");\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_zelo")).arg(&script)
                                                         .output()
                                                         .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello from a file\n");
    assert_eq!(output.status.code(), Some(0));

    let output = Command::new(env!("CARGO_BIN_EXE_zelo")).arg(dir.join("nope.z"))
                                                         .output()
                                                         .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn version_flags() {
    for flag in ["-v", "--version"] {
        let output = Command::new(env!("CARGO_BIN_EXE_zelo")).arg(flag).output().unwrap();
        assert_eq!(output.status.code(), Some(0));
        assert!(String::from_utf8_lossy(&output.stdout).contains("zelo"));
    }
}

#[test]
fn error_output_names_the_code() {
    let output = Command::new(env!("CARGO_BIN_EXE_zelo")).arg("-e")
                                                         .arg("loc x = 1 / 0;")
                                                         .output()
                                                         .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DIVISION_BY_ZERO"), "stderr was: {stderr}");
}
