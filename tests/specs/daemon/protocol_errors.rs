//! Malformed requests close the one connection with an error response but
//! never take the daemon down.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn garbage_bytes_get_an_error_response_and_the_daemon_stays_up() {
    let temp = Project::empty();

    // Any command that talks to the daemon is enough to get it started.
    temp.pynodex().args(&["start", "web", "sleep", "30"]).passes();

    let socket_path = temp.state_path().join("pynodex_daemon.sock");
    let mut stream = UnixStream::connect(&socket_path).expect("connect to daemon socket");
    stream.write_all(b"\x00\x01not json at all\xff\xfe\n").expect("write garbage");

    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read response");
    assert!(response.contains("\"status\":\"error\""), "got: {response}");
    assert!(response.to_lowercase().contains("malformed") || response.to_lowercase().contains("invalid"));

    // Daemon must still answer a well-formed request on a fresh connection.
    temp.pynodex().args(&["list"]).passes().stdout_has("web");

    temp.pynodex().args(&["clear", "all"]).passes();
    temp.pynodex().args(&["daemon", "stop"]).passes();
}
