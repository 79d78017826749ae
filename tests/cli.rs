use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn chipvm() -> Command {
    Command::cargo_bin("chipvm").unwrap()
}

#[test]
fn prints_the_screen_headless() {
    let mut cmd = chipvm();
    cmd.arg("--headless")
        .arg("--cycles")
        .arg("50")
        .arg("tests/files/zero.ch8");

    let top = format!("####{}\n", ".".repeat(60));
    let second = format!("#..#{}\n", ".".repeat(60));
    cmd.assert()
        .success()
        .stdout(contains(top))
        .stdout(contains(second))
        .stdout(contains("PC=0x206 I=0x050"));
}

#[test]
fn fails_on_missing_rom() {
    let mut cmd = chipvm();
    cmd.arg("--headless").arg("tests/files/does-not-exist.ch8");
    cmd.assert()
        .failure()
        .stderr(contains("failed to read ROM"));
}

#[test]
fn fails_on_oversized_rom() {
    let path = std::env::temp_dir().join(format!("chipvm-oversized-{}.ch8", std::process::id()));
    std::fs::write(&path, vec![0u8; 3585]).unwrap();

    let mut cmd = chipvm();
    cmd.arg("--headless").arg(&path);
    cmd.assert()
        .failure()
        .stderr(contains("ROM is too large (3585 bytes), max size is 3584 bytes"));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn invalid_opcode_fails_headless() {
    let mut cmd = chipvm();
    cmd.arg("--headless").arg("tests/files/invalid.ch8");
    cmd.assert()
        .failure()
        .stdout(contains("PC=0x200"))
        .stderr(contains("invalid opcode 0xFFFF at 0x200"));
}

#[test]
fn exit_needs_super_chip() {
    let mut cmd = chipvm();
    cmd.arg("--headless").arg("tests/files/exit.ch8");
    cmd.assert()
        .failure()
        .stderr(contains("invalid opcode 0x00FD at 0x202"));

    let mut cmd = chipvm();
    cmd.arg("--headless")
        .arg("--variant")
        .arg("schip")
        .arg("tests/files/exit.ch8");
    cmd.assert()
        .success()
        .stdout(contains("VA=2A"))
        .stderr(contains("invalid").not());
}

#[test]
fn rejects_unsupported_scale() {
    let mut cmd = chipvm();
    cmd.arg("--scale").arg("3").arg("tests/files/zero.ch8");
    cmd.assert().failure().stderr(contains("not one of"));
}
