#[path = "../../tests/common/mod.rs"]
mod common;

use std::ffi::OsStr;
use std::process::{Command, Output};

use common::{png, TempDir};

fn imscan<S: AsRef<OsStr>>(args: &[S]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_imscan"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_empty_selection_prompts_and_fails() {
    let dir = TempDir::new("cli-empty");
    dir.write("notes.txt", b"no images here");

    let out = imscan(&[dir.path()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    let err = stderr(&out);
    assert!(err.contains("Files selected: 0"), "{}", err);
    assert!(err.contains("Select a folder with images first."), "{}", err);

    let out = imscan(&[dir.path().as_os_str(), OsStr::new("--locale"), OsStr::new("ru")]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Сначала выберите папку с изображениями."));
}

#[test]
fn test_output_formats() {
    let dir = TempDir::new("cli-formats");
    dir.write("a.png", &png(2, 3));
    let path = dir.path().as_os_str();

    let out = imscan(&[path]);
    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.starts_with("File name"), "{}", text);
    assert!(text.contains("2 × 3"), "{}", text);

    let out = imscan(&[path, OsStr::new("--format"), OsStr::new("html")]);
    assert_eq!(out.status.code(), Some(0));
    let html = stdout(&out);
    assert!(html.starts_with("<table>"), "{}", html);
    assert!(html.contains("a.png"), "{}", html);

    let out = imscan(&[path, OsStr::new("--format"), OsStr::new("json")]);
    assert_eq!(out.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json[0]["name"], "a.png");
    assert_eq!(json[0]["width"], 2);
    assert_eq!(json[0]["resolution"]["kind"], "not_specified");
    assert_eq!(json[0]["compression"], "lossless_png");
}

#[test]
fn test_missing_path_is_an_error() {
    let dir = TempDir::new("cli-missing");
    let out = imscan(&[dir.path().join("nothing-here")]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).starts_with("imscan: cannot list input files"));
}
