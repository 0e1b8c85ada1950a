//! Start/stop lifecycle and the registry's basic shape.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn start_registers_a_live_process_on_its_requested_port() {
    let temp = Project::empty();

    temp.pynodex()
        .args(&["start", "web", "--port", "8123", "python3", "-m", "http.server", "8123"])
        .passes();

    let registry = temp.registry();
    let web = &registry["web"];
    assert_eq!(web["port"], 8123);
    assert_eq!(registry.as_object().unwrap().len(), 1);

    let pid = web["pid"].as_u64().expect("pid present") as u32;
    assert!(is_pid_alive(pid), "started process should be alive");

    temp.pynodex().args(&["stop", "web"]).passes();
    temp.pynodex().args(&["daemon", "stop"]).passes();
}

#[test]
#[serial]
fn stop_removes_the_process_within_seven_seconds() {
    let temp = Project::empty();

    temp.pynodex().args(&["start", "slow", "sleep", "30"]).passes();
    let pid = temp.registry()["slow"]["pid"].as_u64().expect("pid present") as u32;

    temp.pynodex().args(&["stop", "slow"]).passes();

    let gone = wait_for(SPEC_WAIT_MAX_MS, || !is_pid_alive(pid));
    assert!(gone, "child should be gone within 7s of stop");
    assert!(temp.registry()["slow"].is_null(), "record should be removed after stop");

    temp.pynodex().args(&["daemon", "stop"]).passes();
}

#[test]
#[serial]
fn stop_is_idempotent() {
    let temp = Project::empty();

    temp.pynodex().args(&["start", "web", "sleep", "30"]).passes();
    temp.pynodex().args(&["stop", "web"]).passes();
    temp.pynodex().args(&["stop", "web"]).fails().stderr_has("web");

    temp.pynodex().args(&["daemon", "stop"]).passes();
}

#[test]
#[serial]
fn restart_keeps_the_record_with_a_new_pid() {
    let temp = Project::empty();

    temp.pynodex().args(&["start", "web", "sleep", "30"]).passes();
    let old_pid = temp.registry()["web"]["pid"].as_u64().expect("pid present") as u32;

    temp.pynodex().args(&["restart", "web"]).passes();

    let registry = temp.registry();
    assert!(!registry["web"].is_null(), "record should still exist after restart");
    let new_pid = registry["web"]["pid"].as_u64().expect("pid present") as u32;
    assert_ne!(old_pid, new_pid, "restart should produce a new pid");
    assert!(is_pid_alive(new_pid), "restarted process should be alive");
    assert_eq!(registry.as_object().unwrap().len(), 1);

    temp.pynodex().args(&["clear", "all"]).passes();
    temp.pynodex().args(&["daemon", "stop"]).passes();
}

#[test]
#[serial]
fn clear_all_empties_the_registry() {
    let temp = Project::empty();

    temp.pynodex().args(&["start", "a", "sleep", "5"]).passes();
    temp.pynodex().args(&["start", "b", "sleep", "5"]).passes();

    temp.pynodex().args(&["clear", "all"]).passes();
    assert!(temp.registry().as_object().unwrap().is_empty());

    // Idempotent: clearing an already-empty registry is a no-op success.
    temp.pynodex().args(&["clear", "all"]).passes();
    assert!(temp.registry().as_object().unwrap().is_empty());

    temp.pynodex().args(&["daemon", "stop"]).passes();
}
