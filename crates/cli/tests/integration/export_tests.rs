//! Export command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

const APP_CONFIG: &str = r#"
[lift]
name = "app"
platforms = ["linux-x86_64", "macos-aarch64"]

[[lift.files]]
name = "app.py"

[[lift.commands]]
exe = "{app.py}"
"#;

fn read_manifest(path: &std::path::Path) -> Value {
  serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn export_prints_one_manifest_per_platform() {
  let env = TestEnv::with_config(APP_CONFIG);
  env.write_file("app.py", "print('hello')");

  let output = env
    .science_cmd()
    .arg("export")
    .arg(&env.config_path)
    .args(["--dest-dir", "dist"])
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let stdout = String::from_utf8(output.stdout).unwrap();
  let paths: Vec<&str> = stdout.lines().collect();
  assert_eq!(paths.len(), 2);
  assert!(paths[0].ends_with("linux-x86_64/lift.json"), "{stdout}");
  assert!(paths[1].ends_with("macos-aarch64/lift.json"), "{stdout}");

  let manifest = read_manifest(&env.path().join("dist/linux-x86_64/lift.json"));
  assert_eq!(manifest["name"], "app");
  assert_eq!(manifest["platform"], "linux-x86_64");
  assert_eq!(manifest["files"][0]["name"], "app.py");
  assert!(env.path().join("dist/macos-aarch64/app.py").exists());
}

#[test]
fn file_mapping_overrides_working_directory() {
  let env = TestEnv::with_config(APP_CONFIG);
  let mapped = env.write_file("build/out/app.py", "print('mapped')");

  env
    .science_cmd()
    .arg("export")
    .arg(&env.config_path)
    .args(["--dest-dir", "dist"])
    .arg("--file")
    .arg(format!("app.py={}", mapped.display()))
    .assert()
    .success();

  let linked = std::fs::read_to_string(env.path().join("dist/linux-x86_64/app.py")).unwrap();
  assert_eq!(linked, "print('mapped')");
}

#[test]
fn re_export_requires_force() {
  let env = TestEnv::with_config(APP_CONFIG);
  env.write_file("app.py", "print('hello')");

  let export = || {
    let mut cmd = env.science_cmd();
    cmd.arg("export").arg(&env.config_path).args(["--dest-dir", "dist"]);
    cmd
  };

  export().assert().success();
  export().assert().failure();
  env.write_file("dist/linux-x86_64/stale.txt", "old");
  export().arg("--force").assert().success();
  assert!(!env.path().join("dist/linux-x86_64/stale.txt").exists());
}

#[test]
fn provenance_is_opt_in() {
  let env = TestEnv::with_config(APP_CONFIG);
  env.write_file("app.py", "print('hello')");

  env
    .science_cmd()
    .arg("export")
    .arg(&env.config_path)
    .args(["--dest-dir", "dist", "--include-provenance"])
    .assert()
    .success();

  let manifest = read_manifest(&env.path().join("dist/linux-x86_64/lift.json"));
  assert_eq!(manifest["science"]["note"], "Generated by science.");
}

#[test]
fn missing_file_is_reported_tersely() {
  let env = TestEnv::with_config(APP_CONFIG);

  env
    .science_cmd()
    .arg("export")
    .arg(&env.config_path)
    .assert()
    .code(1)
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("The file for app.py is not mapped"))
    .stderr(predicate::str::contains("relative to the cwd of"))
    .stderr(predicate::str::contains("Error category").not());
}

#[test]
fn verbose_input_errors_include_the_trace() {
  let env = TestEnv::with_config(APP_CONFIG);

  env
    .science_cmd()
    .arg("-v")
    .arg("export")
    .arg(&env.config_path)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Error category: MissingFile"));
}

#[test]
fn env_vars_configure_export() {
  let env = TestEnv::with_config(APP_CONFIG);
  env.write_file("app.py", "print('hello')");

  env
    .science_cmd()
    .env("SCIENCE_EXPORT_DEST_DIR", env.path().join("from-env"))
    .arg("export")
    .arg(&env.config_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("from-env"));
}

#[test]
fn env_file_mappings_are_whitespace_separated() {
  let env = TestEnv::with_config(
    "[lift]\nname = \"app\"\nplatforms = [\"linux-x86_64\"]\n\n[[lift.files]]\nname = \"app.py\"\n\n[[lift.files]]\nname = \"data.txt\"\n",
  );
  let app = env.write_file("src/app.py", "print('hello')");
  let data = env.write_file("src/data.txt", "data");

  env
    .science_cmd()
    .env(
      "SCIENCE_EXPORT_FILE",
      format!("app.py={} data.txt={}", app.display(), data.display()),
    )
    .arg("export")
    .arg(&env.config_path)
    .args(["--dest-dir", "dist"])
    .assert()
    .success();

  let chroot = env.path().join("dist").join("linux-x86_64");
  assert_eq!(std::fs::read_link(chroot.join("app.py")).unwrap(), app);
  assert_eq!(std::fs::read_link(chroot.join("data.txt")).unwrap(), data);
}

#[test]
fn manifests_exported_before_a_failure_are_still_printed() {
  let env = TestEnv::with_config(
    r#"
[lift]
name = "app"
platforms = ["linux-x86_64", "macos-aarch64"]

[[lift.interpreters]]
id = "cpython"
provider = "static"

  [lift.interpreters.platforms.macos-aarch64]
  name = "cpython-macos.tar.gz"
"#,
  );

  let output = env
    .science_cmd()
    .arg("export")
    .arg(&env.config_path)
    .args(["--dest-dir", "dist"])
    .output()
    .unwrap();
  assert_eq!(output.status.code(), Some(1));

  let stdout = String::from_utf8(output.stdout).unwrap();
  let paths: Vec<&str> = stdout.lines().collect();
  assert_eq!(paths.len(), 1, "{stdout}");
  assert!(paths[0].ends_with("lift.json"), "{stdout}");
  assert!(paths[0].contains("linux-x86_64"), "{stdout}");
  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.contains("The file for cpython-macos.tar.gz is not mapped"), "{stderr}");
}
