//! Memory-ceiling enforcement: the policy monitor restarts a child that
//! exceeds `max_memory_restart` on its next sweep.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn child_exceeding_memory_ceiling_is_restarted() {
    let temp = Project::empty();

    temp.pynodex()
        .args(&[
            "start",
            "hog",
            "--max-memory-restart",
            "10MB",
            "python3",
            "-c",
            "b = bytearray(50 * 1024 * 1024)\nimport time\ntime.sleep(30)",
        ])
        .passes();

    let first_pid = temp.registry()["hog"]["pid"].as_u64().expect("pid present") as u32;

    let restarted = wait_for(3_000, || {
        temp.registry()["hog"]["pid"].as_u64().is_some_and(|pid| pid as u32 != first_pid)
    });
    assert!(restarted, "child over its memory ceiling should be restarted within one sweep");

    temp.pynodex().args(&["clear", "all"]).passes();
    temp.pynodex().args(&["daemon", "stop"]).passes();
}
