//! Build command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[cfg(unix)]
#[test]
fn build_with_custom_jump_writes_binary_and_checksums() {
  let env = TestEnv::with_config("[lift]\nname = \"app\"\n\n[[lift.files]]\nname = \"app.py\"\n");
  env.write_file("app.py", "print('hello')");
  let jump = env.fake_jump("app");

  let output = env
    .science_cmd()
    .arg("build")
    .arg(&env.config_path)
    .args(["--dest-dir", "dist", "--hash", "sha256", "--hash", "md5"])
    .arg("--use-jump")
    .arg(&jump)
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let stdout = String::from_utf8(output.stdout).unwrap();
  assert_eq!(stdout.lines().count(), 1);
  assert!(stdout.trim_end().ends_with("dist/app"), "{stdout}");

  let dist = env.path().join("dist");
  assert!(dist.join("app").is_file());
  let checksum = std::fs::read_to_string(dist.join("app.sha256")).unwrap();
  assert!(checksum.ends_with(" *app\n"), "{checksum}");
  assert!(dist.join("app.md5").is_file());
}

#[cfg(unix)]
#[test]
fn env_hash_algorithms_are_space_separated() {
  let env = TestEnv::with_config("[lift]\nname = \"app\"\n");
  let jump = env.fake_jump("app");

  env
    .science_cmd()
    .env("SCIENCE_BUILD_HASH", "sha256 md5")
    .arg("build")
    .arg(&env.config_path)
    .args(["--dest-dir", "dist"])
    .arg("--use-jump")
    .arg(&jump)
    .assert()
    .success();

  let dist = env.path().join("dist");
  assert!(dist.join("app.sha256").is_file());
  assert!(dist.join("app.md5").is_file());
  assert!(!dist.join("app.sha512").exists());
}

#[cfg(unix)]
#[test]
fn custom_jump_with_many_platforms_warns_and_builds_current() {
  let env = TestEnv::with_config(
    "[lift]\nname = \"app\"\nplatforms = [\"linux-x86_64\", \"linux-aarch64\", \"macos-aarch64\", \"macos-x86_64\"]\n",
  );
  let jump = env.fake_jump("app");

  let output = env
    .science_cmd()
    .arg("build")
    .arg(&env.config_path)
    .args(["--dest-dir", "dist"])
    .arg("--use-jump")
    .arg(&jump)
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.contains("restricting to the current platform"), "{stderr}");
  let stdout = String::from_utf8(output.stdout).unwrap();
  assert_eq!(stdout.lines().count(), 1, "{stdout}");
}

#[test]
fn old_scie_jump_version_is_rejected() {
  let env = TestEnv::with_config("[lift]\nname = \"app\"\n\n[lift.scie_jump]\nversion = \"0.8.0\"\n");

  env
    .science_cmd()
    .arg("build")
    .arg(&env.config_path)
    .assert()
    .code(1)
    .stderr(predicate::str::contains(
      "A scie-jump version of 0.8.0 was requested but science requires at least 0.9.0.",
    ));
}

#[test]
fn missing_custom_jump_is_an_input_error() {
  let env = TestEnv::with_config("[lift]\nname = \"app\"\n");

  env
    .science_cmd()
    .arg("build")
    .arg(&env.config_path)
    .args(["--use-jump", "no-such-jump"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("no-such-jump"))
    .stderr(predicate::str::contains("Error category").not());
}
