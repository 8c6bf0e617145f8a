use std::fs;
use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const RESCUE: &str = include_str!("../../core/tests/fixtures/rescue.pbxproj");
const RESCUE_PATH: &str = "SignalAir-iOS/SignalAir Rescue.xcodeproj/project.pbxproj";

fn pbxforge(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pbxforge").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn write_source(dir: &Path, relative: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "import SwiftUI\n").unwrap();
}

fn rescue_project(dir: &Path) -> PathBuf {
    let path = dir.join(RESCUE_PATH);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, RESCUE).unwrap();
    path
}

#[test]
fn generate_writes_project_and_scheme() {
    let dir = TempDir::new().unwrap();
    write_source(dir.path(), "Demo/A.swift");
    write_source(dir.path(), "Demo/sub/B.swift");

    pbxforge(dir.path())
        .args(["generate", "--name", "Demo", "--bundle-id", "com.example.demo"])
        .arg("--deterministic")
        .assert()
        .success()
        .stdout(predicate::str::contains("generated with manual"))
        .stdout(predicate::str::contains("Demo.xcodeproj"));

    let project = fs::read_to_string(dir.path().join("Demo.xcodeproj/project.pbxproj")).unwrap();
    assert!(project.starts_with("// !$*UTF8*$!\n"));
    assert!(project.contains("/* sub/B.swift in Sources */"));
    assert!(
        dir.path()
            .join("Demo.xcodeproj/xcshareddata/xcschemes/Demo.xcscheme")
            .is_file()
    );
    assert!(dir.path().join("Demo.xcodeproj/xcuserdata").is_dir());
}

#[test]
fn deterministic_generation_is_reproducible() {
    let render = || {
        let dir = TempDir::new().unwrap();
        write_source(dir.path(), "Demo/A.swift");
        pbxforge(dir.path())
            .args(["generate", "--name", "Demo", "--deterministic"])
            .assert()
            .success();
        fs::read_to_string(dir.path().join("Demo.xcodeproj/project.pbxproj")).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn generate_without_sources_fails() {
    let dir = TempDir::new().unwrap();
    pbxforge(dir.path())
        .args(["generate", "--name", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("source root does not exist"));
}

#[test]
fn generate_reads_the_config_file() {
    let dir = TempDir::new().unwrap();
    write_source(dir.path(), "app/Lab/Main.swift");
    fs::write(
        dir.path().join("pbxforge.toml"),
        "[project]\nname = \"Lab\"\nbundle_id = \"org.example.lab\"\n\n[generate]\nroot = \"app\"\n",
    )
    .unwrap();

    pbxforge(dir.path()).arg("generate").assert().success();

    let project =
        fs::read_to_string(dir.path().join("app/Lab.xcodeproj/project.pbxproj")).unwrap();
    assert!(project.contains("PRODUCT_BUNDLE_IDENTIFIER = org.example.lab;"));
}

#[test]
fn patch_registers_the_default_files() {
    let dir = TempDir::new().unwrap();
    let project_file = rescue_project(dir.path());

    pbxforge(dir.path())
        .arg("patch")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 5 files to SignalAir"))
        .stdout(predicate::str::contains("  - SystemHealthMonitor.swift"));

    let patched = fs::read_to_string(project_file).unwrap();
    assert!(patched.contains("/* AutonomousSystemManager.swift in Sources */"));
    assert!(patched.contains("/* AutomaticBanSystem.swift in Sources */"));
}

#[test]
fn patch_dry_run_leaves_the_file_alone() {
    let dir = TempDir::new().unwrap();
    let project_file = rescue_project(dir.path());

    pbxforge(dir.path())
        .args(["patch", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/* SystemHealthMonitor.swift in Sources */"));

    assert_eq!(fs::read_to_string(project_file).unwrap(), RESCUE);
}

#[test]
fn patch_with_unknown_group_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let project_file = rescue_project(dir.path());
    fs::write(
        dir.path().join("custom.toml"),
        "[patch]\ngroups = [{ pattern = \"Services\", group = \"Core/Networking\" }]\n",
    )
    .unwrap();

    pbxforge(dir.path())
        .args(["patch", "--config", "custom.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no group matches anchor `Core/Networking`"));

    assert_eq!(fs::read_to_string(project_file).unwrap(), RESCUE);
}

#[test]
fn patch_with_unknown_target_fails() {
    let dir = TempDir::new().unwrap();
    rescue_project(dir.path());

    pbxforge(dir.path())
        .args(["patch", "--target", "Widget"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("target not found: Widget"));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    pbxforge(dir.path())
        .args(["--config", "absent.toml", "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
