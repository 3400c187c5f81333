use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::io::Write;
use std::process::Command;
use tempfile::{tempdir, NamedTempFile};

const CATALOG: &str = r#"<catalog>
  <spin-scale>0.5</spin-scale>
  <skybox><texture>textures/stars.png</texture><period>30</period></skybox>
  <body>
    <texture>textures/earth.png</texture>
    <tilt>23.44</tilt>
    <period>1</period>
    <atmosphere>textures/clouds.png</atmosphere>
  </body>
  <body>
    <name>moon</name>
    <texture>textures/moon.png</texture>
    <period>27.32</period>
  </body>
</catalog>
"#;

fn write_catalog(contents: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp catalog");
    tmp.write_all(contents.as_bytes()).expect("write catalog");
    tmp
}

#[test]
fn headless_run_reports_frame_times_and_final_state() {
    let mut cmd = Command::cargo_bin("earth-renderer").expect("binary exists");
    cmd.args(["--summary-only", "--select", "earth"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded catalog with 10 bodies"))
        .stdout(contains(" - earth (tilt 23.44 deg, period 0.997 d)"))
        .stdout(contains("frame time: 16.0 ms (62.50 FPS)"))
        .stdout(contains(" - earth visible=true spin=1.20 rad"))
        .stdout(contains(" - sun visible=false spin=0.00 rad"));
}

#[test]
fn headless_run_with_catalog_file() {
    let catalog = write_catalog(CATALOG);
    let mut cmd = Command::cargo_bin("earth-renderer").expect("binary exists");
    cmd.arg(catalog.path())
        .args(["--summary-only", "--frames", "100", "--frame-ms", "10"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded catalog with 2 bodies"))
        .stdout(contains("frame time: 10.0 ms (100.00 FPS)"))
        // 99 deltas of 10 ms at 2π/1000 × 0.5 rad/ms
        .stdout(contains(" - earth visible=true spin=3.11 rad tilt=23.44 deg"))
        .stdout(contains(" - moon visible=false spin=0.00 rad"));
}

#[test]
fn short_run_publishes_no_report() {
    let mut cmd = Command::cargo_bin("earth-renderer").expect("binary exists");
    cmd.args(["--summary-only", "--frames", "20"]);
    cmd.assert()
        .success()
        .stdout(contains("frame time").not())
        .stdout(contains("Final body states:"));
}

#[test]
fn unknown_selection_keeps_default_focus() {
    let mut cmd = Command::cargo_bin("earth-renderer").expect("binary exists");
    cmd.args(["--summary-only", "--select", "pluto"]);
    cmd.assert()
        .success()
        .stdout(contains("unknown body: pluto"))
        .stdout(contains(" - sun visible=true"));
}

#[test]
fn single_mode_loads_one_body() {
    let mut cmd = Command::cargo_bin("earth-renderer").expect("binary exists");
    cmd.args(["--summary-only", "--mode", "single", "--select", "saturn"]);
    cmd.assert()
        .success()
        .stdout(contains(" - saturn visible=true"))
        .stdout(contains(" - earth visible").not());
}

#[test]
fn missing_textures_are_listed() {
    let catalog = write_catalog(CATALOG);
    let assets = tempdir().expect("asset dir");
    fs::create_dir_all(assets.path().join("textures")).expect("textures dir");
    for name in ["stars.png", "earth.png", "moon.png"] {
        fs::write(assets.path().join("textures").join(name), b"").expect("texture");
    }

    let mut cmd = Command::cargo_bin("earth-renderer").expect("binary exists");
    cmd.arg(catalog.path())
        .arg("--summary-only")
        .arg("--assets")
        .arg(assets.path());
    cmd.assert()
        .success()
        .stdout(contains("missing texture: textures/clouds.png"))
        .stdout(contains("missing texture: textures/earth.png").not());
}

#[test]
fn invalid_catalog_fails() {
    let catalog = write_catalog("<catalog><body><name>earth</name></body></catalog>");
    let mut cmd = Command::cargo_bin("earth-renderer").expect("binary exists");
    cmd.arg(catalog.path()).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("failed to load catalog"));
}

#[test]
fn unknown_flag_is_rejected() {
    let mut cmd = Command::cargo_bin("earth-renderer").expect("binary exists");
    cmd.arg("--warp-speed");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --warp-speed"));
}
