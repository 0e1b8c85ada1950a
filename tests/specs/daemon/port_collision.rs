//! Port collisions are reported as errors and leave the registry unchanged.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn second_start_on_a_taken_port_is_rejected() {
    let temp = Project::empty();

    temp.pynodex()
        .args(&["start", "web", "--port", "8123", "python3", "-m", "http.server", "8123"])
        .passes();

    temp.pynodex()
        .args(&["start", "web2", "--port", "8123", "python3", "-m", "http.server", "8123"])
        .fails()
        .stderr_has("8123");

    let registry = temp.registry();
    assert_eq!(registry.as_object().unwrap().len(), 1, "registry should be unchanged by the rejected start");
    assert!(registry["web2"].is_null());

    temp.pynodex().args(&["clear", "all"]).passes();
    temp.pynodex().args(&["daemon", "stop"]).passes();
}

#[test]
#[serial]
fn duplicate_name_is_rejected() {
    let temp = Project::empty();

    temp.pynodex().args(&["start", "web", "sleep", "30"]).passes();
    temp.pynodex().args(&["start", "web", "sleep", "30"]).fails().stderr_has("web");

    temp.pynodex().args(&["clear", "all"]).passes();
    temp.pynodex().args(&["daemon", "stop"]).passes();
}
