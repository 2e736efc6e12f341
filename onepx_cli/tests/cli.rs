/// Process-level tests for the `onepx` binary: exit status, diagnostics on
/// stderr, and what ends up on disk in each mode.
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Output};

use flate2::read::ZlibDecoder;
use onepx_core::{encode_to_vec, Rgb, IEND_CHUNK, IHDR_CHUNK, PNG_SIGNATURE};

// ── helpers ───────────────────────────────────────────────────────────────

fn onepx(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_onepx"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn onepx")
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

// ── valid colors ──────────────────────────────────────────────────────────

#[test]
fn test_writes_reference_png() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("pink.png");

    let out = onepx(&["#FF00AA", path_str(&out_path)]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(out.stderr.is_empty());

    let png = fs::read(&out_path).unwrap();
    assert_eq!(png, encode_to_vec(Rgb::new(0xff, 0x00, 0xaa)).unwrap());
    assert_eq!(&png[..8], &PNG_SIGNATURE);
    assert_eq!(&png[8..33], &IHDR_CHUNK);
    assert_eq!(&png[png.len() - 12..], &IEND_CHUNK);

    // IDAT payload sits between IHDR and IEND after its 8-byte prefix
    let idat_len = u32::from_be_bytes(png[33..37].try_into().unwrap()) as usize;
    assert_eq!(&png[37..41], b"IDAT");
    let mut raw = Vec::new();
    ZlibDecoder::new(&png[41..41 + idat_len])
        .read_to_end(&mut raw)
        .unwrap();
    assert_eq!(raw, vec![0x00, 0xff, 0x00, 0xaa]);
}

#[test]
fn test_written_file_chunk_crcs_verify() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("crc.png");
    let out = onepx(&["0x0a0b0c", path_str(&p)]);
    assert_eq!(out.status.code(), Some(0));

    let png = fs::read(&p).unwrap();
    let mut pos = 8;
    let mut tags = Vec::new();
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let tag_and_payload = &png[pos + 4..pos + 8 + len];
        let stored = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
        assert_eq!(crc32fast::hash(tag_and_payload), stored, "chunk at offset {pos}");
        tags.push(tag_and_payload[..4].to_vec());
        pos += 12 + len;
    }
    assert_eq!(pos, png.len());
    assert_eq!(tags, vec![b"IHDR".to_vec(), b"IDAT".to_vec(), b"IEND".to_vec()]);
}

#[test]
fn test_prefix_and_case_variants_produce_identical_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = Vec::new();
    for (i, color) in ["#FF00AA", "ff00aa", "0xFF00aa"].into_iter().enumerate() {
        let p = dir.path().join(format!("{i}.png"));
        let out = onepx(&[color, path_str(&p)]);
        assert_eq!(out.status.code(), Some(0));
        files.push(fs::read(&p).unwrap());
    }
    assert_eq!(files[0], files[1]);
    assert_eq!(files[1], files[2]);
}

#[test]
fn test_strict_mode_writes_same_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("strict.png");
    let out = onepx(&["--strict", "000000", path_str(&p)]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(fs::read(&p).unwrap(), encode_to_vec(Rgb::new(0, 0, 0)).unwrap());
}

#[test]
fn test_extra_positionals_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("extra.png");
    let out = onepx(&["ffffff", path_str(&p), "ignored"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(fs::read(&p).unwrap(), encode_to_vec(Rgb::new(255, 255, 255)).unwrap());
}

// ── argument errors ───────────────────────────────────────────────────────

#[test]
fn test_single_argument_prints_usage_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let before: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert!(before.is_empty());

    let out = Command::new(env!("CARGO_BIN_EXE_onepx"))
        .arg("#ff00aa")
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("usage: onepx"), "stderr: {err}");
    assert!(err.contains("#RRGGBB"));
    assert!(err.contains("0xRRGGBB"));
    assert!(err.contains("alpha channel is not supported"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0, "no file may be created");
}

#[test]
fn test_no_arguments_fails() {
    let out = onepx(&[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("usage: onepx"));
}

/// Legacy behaviour, pinned on purpose: a bad color leaves an empty file
/// and the process still exits 0. `--strict` is the corrected flow.
#[test]
fn test_unparsable_color_leaves_empty_file_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    for (name, color) in [("z", "zzzzzz"), ("five", "fffff"), ("alpha", "#ff00aa80")] {
        let p = dir.path().join(format!("{name}.png"));
        let out = onepx(&[color, path_str(&p)]);
        assert_eq!(out.status.code(), Some(0), "{color}");
        assert!(stderr(&out).contains("invalid color"), "{color}: {}", stderr(&out));
        assert_eq!(fs::read(&p).unwrap(), Vec::<u8>::new(), "{color}");
    }
}

#[test]
fn test_hyphen_leading_color_is_treated_as_a_bad_color() {
    let dir = tempfile::tempdir().unwrap();

    let p = dir.path().join("dash.png");
    let out = onepx(&["-zzzzz", path_str(&p)]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let err = stderr(&out);
    assert!(err.contains("invalid color"), "stderr: {err}");
    assert!(!err.contains("usage:"));
    assert_eq!(fs::read(&p).unwrap(), Vec::<u8>::new());

    let p = dir.path().join("dash_strict.png");
    let out = onepx(&["--strict", "-zzzzz", path_str(&p)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid color"));
    assert!(!p.exists());
}

#[test]
fn test_unparsable_color_truncates_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("old.png");
    fs::write(&p, b"previous contents").unwrap();

    let out = onepx(&["nothex", path_str(&p)]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(fs::metadata(&p).unwrap().len(), 0);
}

#[test]
fn test_alpha_diagnostic_names_the_limitation() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("a.png");
    let out = onepx(&["ff00aa80", path_str(&p)]);
    assert!(stderr(&out).contains("alpha channel is not supported"));
}

#[test]
fn test_strict_rejects_bad_color_before_creating_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("never.png");
    let out = onepx(&["--strict", "zzzzzz", path_str(&p)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid color"));
    assert!(!p.exists());
}

// ── resource errors ───────────────────────────────────────────────────────

#[test]
fn test_unopenable_output_fails_with_system_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("missing").join("out.png");
    for args in [vec!["ff00aa"], vec!["--strict", "ff00aa"]] {
        let mut args = args;
        args.push(path_str(&p));
        let out = onepx(&args);
        assert_eq!(out.status.code(), Some(1));
        let err = stderr(&out);
        assert!(err.contains("cannot open file"), "stderr: {err}");
        assert!(!p.exists());
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_write_failures_on_full_device() {
    let writable = fs::OpenOptions::new().write(true).open("/dev/full").is_ok();
    if !Path::new("/dev/full").exists() || !writable {
        return;
    }

    // compat: every chunk fails, each is reported, exit status stays 0
    let out = onepx(&["ff00aa", "/dev/full"]);
    assert_eq!(out.status.code(), Some(0));
    let err = stderr(&out);
    assert!(err.contains("failed to write signature"), "stderr: {err}");
    assert!(err.contains("failed to write IHDR"));
    assert!(err.contains("idat write length failed"));
    assert!(err.contains("failed to write IEND"));
    assert_eq!(err.matches("failed to write IHDR").count(), 1, "stderr: {err}");
    assert_eq!(err.lines().count(), 4, "stderr: {err}");

    // strict: first failure is fatal
    let out = onepx(&["--strict", "ff00aa", "/dev/full"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("failed to write signature"), "stderr: {err}");
    assert!(!err.contains("IHDR"));
}
