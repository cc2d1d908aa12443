use assert_cmd::Command;

fn cmd() -> Command {
    Command::cargo_bin("exprcalc").unwrap()
}

#[test]
fn single_arg() {
    cmd().arg("2 + 3 * 4").assert().success().stdout("14\n");
}

#[test]
fn joined_args() {
    cmd()
        .args(["10", "-", "2", "**", "3"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn fractional_and_infinite() {
    cmd().arg("1 / 2").assert().success().stdout("0.5\n");
    cmd().arg("5 / 0").assert().success().stdout("inf\n");
    cmd().arg("0 / 0").assert().success().stdout("NaN\n");
}

#[test]
fn tree() {
    cmd()
        .args(["--tree", "2 ** 3 ** 2 - 1"])
        .assert()
        .success()
        .stdout("((2 ** (3 ** 2)) - 1)\n");
}

#[test]
fn mark_error_after_line_end() {
    let (blue, red, esc) = ("\x1B[1;94m", "\x1B[1;91m", "\x1B[0m");
    let output = format!(
        "{blue}01 │{esc} 4 -\n   {blue}│{esc}    {red}^{esc}\n   {blue}│{esc} {red}Missing an operand{esc}\n\n"
    );

    cmd().arg("4 -").assert().failure().stdout(output);
}

#[test]
fn decimal_literal() {
    cmd().arg("3.5").assert().failure();
}

#[test]
fn missing_expression() {
    cmd().assert().failure();
}

#[test]
fn from_file() {
    let path = std::env::temp_dir().join(format!("exprcalc-{}.txt", std::process::id()));
    std::fs::write(&path, "3 ** 2 ** 2\n").unwrap();

    cmd()
        .arg("--path")
        .arg(&path)
        .assert()
        .success()
        .stdout("81\n");

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn unreadable_file() {
    cmd()
        .args(["-p", "/nonexistent/exprcalc/input"])
        .assert()
        .failure();
}
