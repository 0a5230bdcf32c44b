mod common;

use common::TestContext;
use laraforge::domain::artifacts;
use predicates::prelude::*;

#[test]
fn cleanup_succeeds_when_nothing_is_left_over() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("All temporary files have been cleaned up"));
}

#[test]
fn cleanup_removes_exactly_the_registered_files() {
    let ctx = TestContext::new();

    for name in artifacts::TEMP_ARTIFACTS {
        ctx.write_artifact(name, "leftover");
    }
    ctx.write_artifact("unrelated.txt", "keep me");

    ctx.cli()
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removing temporary file: nginx_site.conf"));

    for name in artifacts::TEMP_ARTIFACTS {
        assert!(!ctx.work_dir().join(name).exists(), "{name} should have been removed");
    }
    assert!(ctx.work_dir().join("unrelated.txt").exists());
}

#[test]
fn cleanup_reports_each_removal() {
    let ctx = TestContext::new();
    ctx.write_artifact(artifacts::MYSQL_BOOTSTRAP, "leftover");

    ctx.cli()
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removing temporary file: mysql_bootstrap.sql"))
        .stdout(predicate::str::contains("Removing temporary file: ssh_security.conf").not());
}
