//! Integration tests for the ufonorm CLI.
//!
//! These run the built binary against small UFOs written into temporary
//! directories. Stdout is not a terminal under test, so every command
//! answers in JSON.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn ufonorm(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ufonorm").expect("Failed to find ufonorm binary");
    cmd.env_remove("UFONORM_PARAMS")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", config_home);
    cmd
}

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// A one-glyph UFO 3 with loose formatting.
fn sample_ufo(parent: &Path) -> std::path::PathBuf {
    let ufo = parent.join("Sample.ufo");
    write(
        &ufo,
        "metainfo.plist",
        "<plist version=\"1.0\"><dict><key>formatVersion</key><integer>3</integer><key>creator</key><string>test</string></dict></plist>",
    );
    write(
        &ufo,
        "layercontents.plist",
        "<plist version=\"1.0\"><array><array><string>public.default</string><string>glyphs</string></array></array></plist>",
    );
    write(
        &ufo,
        "fontinfo.plist",
        "<plist version=\"1.0\"><dict><key>unitsPerEm</key><real>1000.0</real><key>familyName</key><string>Sample</string></dict></plist>",
    );
    write(
        &ufo,
        "glyphs/contents.plist",
        "<plist version=\"1.0\"><dict><key>a</key><string>a.glif</string></dict></plist>",
    );
    write(
        &ufo,
        "glyphs/a.glif",
        "<glyph name=\"a\" format=\"2\"><advance width=\"510.25000001\"/><unicode hex=\"0061\"/></glyph>",
    );
    ufo
}

mod filename {
    use super::*;

    #[test]
    fn test_filename_json() {
        let home = tempdir().unwrap();
        ufonorm(home.path())
            .args(["--json", "filename", "a", "A", "con", ".notdef"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"file\":\"A_.glif\""))
            .stdout(predicate::str::contains("\"file\":\"_con.glif\""))
            .stdout(predicate::str::contains("\"file\":\"_notdef.glif\""));
    }

    #[test]
    fn test_filename_requires_names() {
        let home = tempdir().unwrap();
        ufonorm(home.path()).arg("filename").assert().failure();
    }
}

mod normalize {
    use super::*;

    fn setup() -> (TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let ufo = sample_ufo(dir.path());
        (dir, ufo)
    }

    #[test]
    fn test_normalize_in_place_then_idempotent() {
        let (dir, ufo) = setup();
        ufonorm(dir.path())
            .args(["normalize", ufo.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"written\":["));

        let glif = fs::read_to_string(ufo.join("glyphs/a.glif")).unwrap();
        assert!(glif.contains("<advance width=\"510.25\"/>"), "{glif}");
        let fontinfo = fs::read_to_string(ufo.join("fontinfo.plist")).unwrap();
        assert!(fontinfo.contains("<integer>1000</integer>"));

        ufonorm(dir.path())
            .args(["normalize", ufo.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"written\":[]"))
            .stdout(predicate::str::contains("\"deleted_files\":[]"));
    }

    #[test]
    fn test_normalize_to_output_with_params() {
        let (dir, ufo) = setup();
        let out = dir.path().join("Out.ufo");
        ufonorm(dir.path())
            .args([
                "normalize",
                ufo.to_str().unwrap(),
                "-o",
                out.to_str().unwrap(),
                "-p",
                "precision=0",
                "-p",
                "UFOversion=2",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"ufo_version\":2"));

        let glif = fs::read_to_string(out.join("glyphs/a.glif")).unwrap();
        assert!(glif.contains("width=\"510\""), "{glif}");
        assert!(glif.contains("format=\"1\""));
        assert!(!out.join("layercontents.plist").exists());
    }

    #[test]
    fn test_normalize_refuses_non_ufo_output() {
        let (dir, ufo) = setup();
        let out = dir.path().join("not-a-font");
        write(&out, "notes.txt", "keep me");
        ufonorm(dir.path())
            .args(["normalize", ufo.to_str().unwrap(), "-o", out.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("NOT_A_UFO"));
        assert!(out.join("notes.txt").exists());
    }

    #[test]
    fn test_normalize_missing_input() {
        let dir = tempdir().unwrap();
        ufonorm(dir.path())
            .args(["normalize", dir.path().join("Missing.ufo").to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("NOT_A_DIRECTORY"));
    }

    #[test]
    fn test_unknown_param_is_config_error() {
        let (dir, ufo) = setup();
        ufonorm(dir.path())
            .args(["normalize", ufo.to_str().unwrap(), "-p", "bogus=1"])
            .assert()
            .code(7)
            .stderr(predicate::str::contains("CONFIG_ERROR"));
    }
}

mod params {
    use super::*;

    #[test]
    fn test_params_file_and_overrides() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("params.json");
        fs::write(&file, r#"{"precision": 3, "sortDicts": false}"#).unwrap();
        ufonorm(dir.path())
            .args(["params", "--params-file", file.to_str().unwrap(), "-p", "renameFiles=true"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"precision\":3"))
            .stdout(predicate::str::contains("\"sortDicts\":false"))
            .stdout(predicate::str::contains("\"renameFiles\":true"));
    }

    #[test]
    fn test_missing_params_file() {
        let dir = tempdir().unwrap();
        ufonorm(dir.path())
            .args(["params", "--params-file", dir.path().join("nope.json").to_str().unwrap()])
            .assert()
            .code(2);
    }
}

#[test]
fn test_completions_bash() {
    let dir = tempdir().unwrap();
    ufonorm(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ufonorm"));
}
