use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;
use common::day;

#[test]
fn test_cli_end_to_end() {
    let file = common::command_file(&[
        &format!("register, account0, , , {}", day(0)),
        "register, account1, , , ",
        "add_beneficiary, account0, account2, 1.0, ",
        "add_beneficiary, account0, account3, 2.0, ",
        "add_beneficiary, account0, account4, 3.0, ",
        "add_beneficiary, account0, account2, 2.0, ",
        &format!("renew_subscribe, account1, , , {}", day(40)),
        &format!("control_valid_subscription, account1, , , {}", day(61)),
        "control_valid_subscription, account0, , , ",
    ]);

    let mut cmd = Command::new(cargo_bin!("testament"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("event,from,to,amount"))
        .stdout(predicate::str::contains(
            "registered,account0,,\nregistered,account1,,\n\
             testament_triggered,account0,account2,3\n\
             testament_triggered,account0,account3,2\n\
             testament_triggered,account0,account4,3\n",
        ))
        .stderr(predicate::str::contains("Command rejected"))
        .stderr(predicate::str::contains("still valid"));
}

#[test]
fn test_repeat_control_is_not_paid_twice() {
    let file = common::command_file(&[
        &format!("register, alice, , , {}", day(0)),
        "add_beneficiary, alice, bob, 5, ",
        &format!("control_valid_subscription, alice, , , {}", day(61)),
        "control_valid_subscription, alice, , , ",
    ]);

    let output = Command::new(cargo_bin!("testament"))
        .arg(file.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("testament_triggered,alice,bob,5").count(), 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is not registered"));
}

#[test]
fn test_unsubscribe_refund_and_reregistration() {
    let file = common::command_file(&[
        &format!("register, alice, , , {}", day(0)),
        "add_beneficiary, alice, bob, 1.5, ",
        "add_beneficiary, alice, carol, 1.5, ",
        "unsubscribe, alice, , , ",
        "register, alice, , , ",
    ]);

    let mut cmd = Command::new(cargo_bin!("testament"));
    cmd.arg(file.path());

    cmd.assert().success().stdout(predicate::str::contains(
        "registered,alice,,\nunsubscribed,alice,alice,3\nregistered,alice,,\n",
    ));
}

#[test]
fn test_custom_validity_window() {
    let file = common::command_file(&[
        &format!("register, alice, , , {}", day(0)),
        "add_beneficiary, alice, bob, 1, ",
        &format!("control_valid_subscription, alice, , , {}", day(11)),
    ]);

    let mut cmd = Command::new(cargo_bin!("testament"));
    cmd.arg(file.path()).arg("--validity-days").arg("10");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("testament_triggered,alice,bob,1"));
}
