use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

type StdResult = Result<(), Box<dyn std::error::Error>>;

fn cmd() -> Command {
    Command::cargo_bin("huffcodec").expect("binary built")
}

fn roundtrip(variant: &str, data: &[u8]) -> StdResult {
    let dir = tempfile::tempdir()?;
    let in_path = dir.path().join("in.bin");
    let enc_path = dir.path().join("enc.bin");
    let dec_path = dir.path().join("dec.bin");
    std::fs::write(&in_path, data)?;

    cmd()
        .arg("encode")
        .arg("-v")
        .arg(variant)
        .arg("-i")
        .arg(&in_path)
        .arg("-o")
        .arg(&enc_path)
        .assert()
        .success();

    cmd()
        .arg("decode")
        .arg("-v")
        .arg(variant)
        .arg("-i")
        .arg(&enc_path)
        .arg("-o")
        .arg(&dec_path)
        .assert()
        .success();

    assert_eq!(std::fs::read(&dec_path)?, data);
    Ok(())
}

#[test]
fn traditional_roundtrips_via_cli() -> StdResult {
    roundtrip("traditional", b"")?;
    roundtrip("traditional", b"the quick brown fox jumps over the lazy dog")?;
    roundtrip("traditional", b"AAAA")
}

#[test]
fn canonical_roundtrips_via_cli() -> StdResult {
    roundtrip("canonical", b"")?;
    roundtrip("canonical", b"the quick brown fox jumps over the lazy dog")?;
    roundtrip("canonical", b"AAAA")
}

#[test]
fn encode_without_output_writes_to_stdout() -> StdResult {
    let dir = tempfile::tempdir()?;
    let in_path = dir.path().join("in.bin");
    std::fs::write(&in_path, b"hello, huffman")?;

    let output = cmd()
        .arg("encode")
        .arg("-v")
        .arg("canonical")
        .arg("-i")
        .arg(&in_path)
        .output()?;
    assert!(output.status.success());
    assert!(!output.stdout.is_empty());
    Ok(())
}

#[test]
fn show_tree_lists_eof_and_succeeds() -> StdResult {
    let dir = tempfile::tempdir()?;
    let in_path = dir.path().join("in.bin");
    std::fs::write(&in_path, b"aabbbcccc")?;

    cmd()
        .arg("show-tree")
        .arg("-v")
        .arg("traditional")
        .arg("-i")
        .arg(&in_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("EOF"));

    cmd()
        .arg("show-tree")
        .arg("-v")
        .arg("canonical")
        .arg("-i")
        .arg(&in_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("EOF"));
    Ok(())
}

#[test]
fn decode_rejects_truncated_traditional_header() -> StdResult {
    let dir = tempfile::tempdir()?;
    let in_path = dir.path().join("in.bin");
    let enc_path = dir.path().join("enc.bin");
    let trunc_path = dir.path().join("trunc.bin");
    std::fs::write(&in_path, b"aaabbc")?;

    cmd()
        .arg("encode")
        .arg("-v")
        .arg("traditional")
        .arg("-i")
        .arg(&in_path)
        .arg("-o")
        .arg(&enc_path)
        .assert()
        .success();

    let full = std::fs::read(&enc_path)?;
    let mut trunc_file = std::fs::File::create(&trunc_path)?;
    trunc_file.write_all(&full[0..8])?;
    drop(trunc_file);

    let dec_path = dir.path().join("dec.bin");
    cmd()
        .arg("decode")
        .arg("-v")
        .arg("traditional")
        .arg("-i")
        .arg(&trunc_path)
        .arg("-o")
        .arg(&dec_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed input"));
    Ok(())
}

#[test]
fn decode_rejects_truncated_canonical_header() -> StdResult {
    let dir = tempfile::tempdir()?;
    let in_path = dir.path().join("in.bin");
    let enc_path = dir.path().join("enc.bin");
    let trunc_path = dir.path().join("trunc.bin");
    std::fs::write(&in_path, b"abc")?;

    cmd()
        .arg("encode")
        .arg("-v")
        .arg("canonical")
        .arg("-i")
        .arg(&in_path)
        .arg("-o")
        .arg(&enc_path)
        .assert()
        .success();

    let full = std::fs::read(&enc_path)?;
    let mut trunc_file = std::fs::File::create(&trunc_path)?;
    trunc_file.write_all(&full[0..100])?;
    drop(trunc_file);

    let dec_path = dir.path().join("dec.bin");
    cmd()
        .arg("decode")
        .arg("-v")
        .arg("canonical")
        .arg("-i")
        .arg(&trunc_path)
        .arg("-o")
        .arg(&dec_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed input"));
    Ok(())
}

#[test]
fn missing_input_file_fails_with_nonzero_exit() {
    cmd()
        .arg("decode")
        .arg("-v")
        .arg("traditional")
        .arg("-i")
        .arg("/no/such/path/does-not-exist")
        .assert()
        .failure();
}

#[test]
fn invalid_variant_is_rejected_by_clap() {
    let dir = tempfile::tempdir().expect("tempdir");
    let in_path = dir.path().join("in.bin");
    std::fs::write(&in_path, b"hi").expect("write fixture");
    cmd()
        .arg("encode")
        .arg("-v")
        .arg("bogus")
        .arg("-i")
        .arg(&in_path)
        .assert()
        .failure();
}
