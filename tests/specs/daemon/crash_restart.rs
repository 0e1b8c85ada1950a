//! Auto-restart on crash, driven by the policy monitor's sweep.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn crashing_child_is_restarted_with_a_new_pid() {
    let temp = Project::empty();

    temp.pynodex()
        .args(&["start", "crash", "--restart-delay-ms", "100", "sh", "-c", "exit 1"])
        .passes();

    let first_pid = temp.registry()["crash"]["pid"].as_u64().expect("pid present") as u32;

    let restarted = wait_for(2_000, || {
        temp.registry()["crash"]["pid"].as_u64().is_some_and(|pid| pid as u32 != first_pid)
    });
    assert!(restarted, "crashing child should get a new pid within 2s");
    assert_eq!(temp.registry()["crash"]["status"], "running");

    let second_pid = temp.registry()["crash"]["pid"].as_u64().unwrap() as u32;
    let restarted_again = wait_for(2_000, || {
        temp.registry()["crash"]["pid"].as_u64().is_some_and(|pid| pid as u32 != second_pid)
    });
    assert!(restarted_again, "a second crash cycle should also produce a new pid");

    temp.pynodex().args(&["clear", "all"]).passes();
    temp.pynodex().args(&["daemon", "stop"]).passes();
}

#[test]
#[serial]
fn no_autorestart_leaves_the_child_dead() {
    let temp = Project::empty();

    temp.pynodex()
        .args(&["start", "oneshot", "--no-autorestart", "sh", "-c", "exit 1"])
        .passes();

    let stays_dead = wait_for(1_500, || {
        !temp.registry()["oneshot"]["status"].as_str().unwrap_or("").eq("running")
    });
    assert!(stays_dead, "status should reflect the dead child");

    std::thread::sleep(std::time::Duration::from_millis(500));
    assert_ne!(temp.registry()["oneshot"]["status"], "running");

    temp.pynodex().args(&["clear", "all"]).passes();
    temp.pynodex().args(&["daemon", "stop"]).passes();
}
