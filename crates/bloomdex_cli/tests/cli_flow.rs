use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn cli_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bloomdex"))
}

fn write_docs(dir: &Path) -> String {
    let p = dir.join("docs.txt");
    std::fs::write(
        &p,
        "large black cat\nthe small grey dog\nthe large grey cat\nsmall pumpkins\n\n\
         orange pumpkins\nblue smurfs\nsmall smurfs\nsmall blue gophers\n",
    )
    .unwrap();
    p.to_str().unwrap().to_owned()
}

#[test]
fn query_flat_index() {
    let tmp = tempdir().expect("tempdir");
    let docs = write_docs(tmp.path());

    cli_cmd()
        .args(["query", "--docs", &docs, "smurfs"])
        .assert()
        .success()
        .stdout(predicate::eq("5\tblue smurfs\n6\tsmall smurfs\n"));

    cli_cmd()
        .args(["query", "--docs", &docs, "--json", "small", "smurfs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": 6").and(predicate::str::contains("small smurfs")));
}

#[test]
fn query_sharded_index() {
    let tmp = tempdir().expect("tempdir");
    let docs = write_docs(tmp.path());

    cli_cmd()
        .args(["query", "--docs", &docs, "--sharded", "--fpr", "0.01", "pumpkins"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3\tsmall pumpkins").and(predicate::str::contains("4\torange pumpkins")));
}

#[test]
fn stats_and_config_file() {
    let tmp = tempdir().expect("tempdir");
    let docs = write_docs(tmp.path());
    let cfg = tmp.path().join("cfg.json");
    std::fs::write(&cfg, r#"{"block_bits":512,"meta_bits":32768,"hashes":3}"#).unwrap();

    cli_cmd()
        .args(["stats", "--docs", &docs, "--config", cfg.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"kind\": \"flat\"")
                .and(predicate::str::contains("\"documents\": 8"))
                .and(predicate::str::contains("\"block_bits\": 512")),
        );

    cli_cmd()
        .args(["stats", "--docs", &docs, "--sharded"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"sharded\"").and(predicate::str::contains("\"shard\": 2")));
}

#[test]
fn rejects_invalid_config() {
    let tmp = tempdir().expect("tempdir");
    let docs = write_docs(tmp.path());

    cli_cmd()
        .args(["query", "--docs", &docs, "--block-bits", "300", "cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));

    cli_cmd()
        .args(["query", "--docs", &docs, "--sharded", "--fpr", "1.5", "cat"])
        .assert()
        .failure();
}
