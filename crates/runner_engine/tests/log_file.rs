use std::fs;

use runner_engine::{log_file_name, RunLog};
use tempfile::TempDir;

#[test]
fn log_name_uses_config_basename_and_start_time() {
    assert_eq!(
        log_file_name("confs/nested/Bank.conf", 1_700_000_000_123),
        "Bank.conf-1700000000123.log"
    );
    assert_eq!(log_file_name("Vault.conf", 5), "Vault.conf-5.log");
}

#[test]
fn create_makes_directory_and_empty_file() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("certora-logs");
    let log = RunLog::create(&dir, "confs/Bank.conf", 42).unwrap();

    assert_eq!(log.path(), dir.join("Bank.conf-42.log"));
    assert_eq!(fs::read_to_string(log.path()).unwrap(), "");
}

#[test]
fn appends_accumulate_in_order() {
    let temp = TempDir::new().unwrap();
    let log = RunLog::create(temp.path(), "a.conf", 1).unwrap();
    log.append("first\n").unwrap();
    log.append("").unwrap();
    log.append("second\n").unwrap();

    assert_eq!(fs::read_to_string(log.path()).unwrap(), "first\nsecond\n");
}

#[test]
fn log_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("certora-logs");
    fs::write(&not_a_dir, "x").unwrap();

    assert!(RunLog::create(&not_a_dir, "a.conf", 1).is_err());
}

#[test]
fn append_after_removal_fails_instead_of_recreating() {
    let temp = TempDir::new().unwrap();
    let log = RunLog::create(temp.path(), "a.conf", 1).unwrap();
    fs::remove_file(log.path()).unwrap();

    assert!(log.append("late\n").is_err());
}
