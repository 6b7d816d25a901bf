use assert_cmd::Command;

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("kira-recist").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn run_help_smoke() {
    let mut cmd = Command::cargo_bin("kira-recist").unwrap();
    cmd.args(["run", "--help"]);
    cmd.assert().success();
}
